//! Whole-document conversion for books without recognizable sections.

use crate::markdown;
use crate::section::{OpenSection, Section, SectionKind};
use crate::tag::{self, Element, EventHandler, OpenTag};

pub const FALLBACK_SECTION_ID: &str = "full-text";

/// Convert the whole document into one chapter titled `title`.
///
/// Returns `None` when the document has no convertible text.
pub fn convert_whole(html: &str, title: &str) -> Option<Section> {
    let content = tag::drive(html, WholeDocument::default()).content;

    let mut section = OpenSection::new(FALLBACK_SECTION_ID, SectionKind::Chapter, Some(title.to_string()));
    section.push(content);
    section.finalize()
}

#[derive(Default)]
struct WholeDocument {
    content: String,
    text: String,
    /// Nesting depth inside a boilerplate container; zero outside.
    boilerplate_depth: usize,
}

impl WholeDocument {
    /// Emit the buffered text as a block, if there is any.
    fn flush(&mut self, render: impl FnOnce(&str) -> String) {
        let text = self.text.trim();
        if text.is_empty() {
            return;
        }
        self.content.push_str(&render(text));
        self.text.clear();
    }
}

impl EventHandler for WholeDocument {
    fn open(&mut self, tag: &OpenTag) {
        if tag.class_contains("pg-boilerplate") {
            self.boilerplate_depth = 1;
            return;
        }
        if self.boilerplate_depth > 0 {
            if tag.element == Element::Container {
                self.boilerplate_depth += 1;
            }
            return;
        }

        match tag.element {
            Element::Paragraph | Element::Heading(_) => self.text.clear(),
            Element::LineBreak => self.text.push_str(markdown::LINE_BREAK),
            Element::Emphasis => self.text.push_str(markdown::EMPHASIS),
            Element::Strong => self.text.push_str(markdown::STRONG),
            Element::Rule => self.content.push_str("\n---\n\n"),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        let element = Element::from_name(name);

        if self.boilerplate_depth > 0 {
            if element == Element::Container {
                self.boilerplate_depth -= 1;
            }
            return;
        }

        match element {
            Element::Paragraph => self.flush(|text| format!("{text}{}", markdown::PARAGRAPH_BREAK)),
            Element::Heading(level) => self.flush(|text| markdown::heading_line(level, text)),
            Element::Emphasis => self.text.push_str(markdown::EMPHASIS),
            Element::Strong => self.text.push_str(markdown::STRONG),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.boilerplate_depth == 0 {
            self.text.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_everything_into_one_section() {
        let html = "<html><head><title>T</title></head><body>\
            <h1>A Tale</h1><p>First <i>line</i>.</p><hr><h4>Aside</h4><p>Second<br>line</p>\
            </body></html>";
        let section = convert_whole(html, "A Tale").expect("content");
        assert_eq!(section.id, FALLBACK_SECTION_ID);
        assert_eq!(section.kind, SectionKind::Chapter);
        assert_eq!(section.title, "A Tale");
        assert_eq!(
            section.content,
            "# A Tale\n\nFirst *line*.\n\n\n---\n\n### Aside\n\nSecond  \nline"
        );
    }

    #[test]
    fn test_boilerplate_is_skipped() {
        let html = r#"<section class="pg-boilerplate"><div><p>License</p></div><p>Terms</p></section><p>Body</p>"#;
        assert_eq!(convert_whole(html, "T").unwrap().content, "Body");
    }

    #[test]
    fn test_empty_document_has_no_section() {
        assert!(convert_whole("", "T").is_none());
        assert!(convert_whole("<html><body><p>  </p></body></html>", "T").is_none());
    }
}
