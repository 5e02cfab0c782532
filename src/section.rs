use serde::Serialize;

/// Classification of a logical section of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    FrontMatter,
    Chapter,
    BackMatter,
    /// Table of contents. Never surfaced to callers.
    Toc,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::FrontMatter => "front_matter",
            SectionKind::Chapter => "chapter",
            SectionKind::BackMatter => "back_matter",
            SectionKind::Toc => "toc",
        }
    }
}

/// A finalized section of converted Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub kind: SectionKind,
    pub title: String,
    pub content: String,
}

/// The section currently being accumulated by a converter.
///
/// Content is kept as ordered fragments and only joined when the section is
/// finalized; after that it is never touched again.
#[derive(Debug)]
pub(crate) struct OpenSection {
    pub id: String,
    pub kind: SectionKind,
    pub title: Option<String>,
    fragments: Vec<String>,
}

impl OpenSection {
    pub fn new(id: impl Into<String>, kind: SectionKind, title: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title,
            fragments: Vec::new(),
        }
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    /// Join the fragments and close the section.
    ///
    /// Returns `None` for table-of-contents sections and for sections whose
    /// trimmed content is empty.
    pub fn finalize(self) -> Option<Section> {
        if self.kind == SectionKind::Toc {
            return None;
        }

        let content = self.fragments.concat().trim().to_string();
        if content.is_empty() {
            return None;
        }

        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => self.id.clone(),
        };

        Some(Section {
            id: self.id,
            kind: self.kind,
            title,
            content,
        })
    }
}
