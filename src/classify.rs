//! Section-boundary classification.
//!
//! Two entry points decide whether something starts a new section and what
//! kind of section it is: an element `id` attribute, or the text of a heading.
//! The rules are ordered tables evaluated top to bottom, first match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::section::SectionKind;
use crate::toc::TocAnchors;

/// A shape pattern and the section kind it implies.
struct Rule {
    pattern: Regex,
    kind: SectionKind,
}

impl Rule {
    fn new(pattern: &str, kind: SectionKind) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid classification pattern"),
            kind,
        }
    }
}

fn first_match(rules: &[Rule], text: &str) -> Option<SectionKind> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.kind)
}

// -- Heading text rules (input is normalized: lowercase, single spaces) --
static HEADING_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        r"^chapter\s+[ivxlcdm\d]+",
        r"^chap\.\s*[ivxlcdm\d]+",
        r"^[ivxlcdm]+\.$",
        r"^\d+\.$",
        r"^letter\s+[ivxlcdm\d]+",
        r"^volume\s+[ivxlcdm\d]+",
        r"^book\s+[ivxlcdm\d]+",
        r"^part\s+[ivxlcdm\d]+",
    ]
    .into_iter()
    .map(|pattern| Rule::new(pattern, SectionKind::Chapter))
    .collect()
});

// -- Element id rules (input is lowercased) --
static ID_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        r"^chapter[-_]?[ivxlcdm\d]+",
        r"^chap[-_]?[ivxlcdm\d]+",
        r"^ch[-_]?[ivxlcdm\d]+",
        r"^letter[-_]?[ivxlcdm\d]+",
        r"^book[-_]?[ivxlcdm\d]+",
        r"^part[-_]?[ivxlcdm\d]+",
        r"^volume[-_]?[ivxlcdm\d]+",
        r"^[ivxlcdm]+$",
        r"^\d+$",
    ]
    .into_iter()
    .map(|pattern| Rule::new(pattern, SectionKind::Chapter))
    .collect()
});

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

const HEADING_FRONT_MATTER: &[&str] = &[
    "preface",
    "introduction",
    "foreword",
    "prologue",
    "dedication",
    "acknowledgment",
    "acknowledgement",
    "note to the reader",
    "author's note",
    "contents",
    "table of contents",
];

const HEADING_BACK_MATTER: &[&str] = &[
    "epilogue",
    "afterword",
    "appendix",
    "notes",
    "endnotes",
    "footnotes",
    "glossary",
    "index",
    "bibliography",
    "about the author",
];

const ID_DENYLIST: &[&str] = &["gutenberg", "license", "pg-", "boilerplate"];
const ID_FRONT_MATTER: &[&str] = &["preface", "introduction", "foreword", "prologue", "dedication"];
const ID_BACK_MATTER_TOC: &[&str] = &["epilogue", "afterword", "appendix", "notes", "index", "glossary"];
const ID_BACK_MATTER: &[&str] = &[
    "epilogue",
    "afterword",
    "appendix",
    "index",
    "glossary",
    "bibliography",
];
const ID_CONTENTS: &[&str] = &["content", "toc"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Classify an element `id` attribute.
///
/// Ids containing a boilerplate marker are never boundaries. Ids linked from
/// the table of contents always are, typed by keyword and defaulting to
/// [`SectionKind::Chapter`]. Other ids must match a chapter shape or carry a
/// front-matter, back-matter or contents keyword.
pub fn classify_id(id: &str, toc_anchors: &TocAnchors) -> Option<SectionKind> {
    let lower = id.to_lowercase();

    if contains_any(&lower, ID_DENYLIST) {
        return None;
    }

    if toc_anchors.contains(id) {
        let kind = if contains_any(&lower, ID_FRONT_MATTER) {
            SectionKind::FrontMatter
        } else if contains_any(&lower, ID_BACK_MATTER_TOC) {
            SectionKind::BackMatter
        } else if contains_any(&lower, ID_CONTENTS) {
            SectionKind::Toc
        } else {
            SectionKind::Chapter
        };
        return Some(kind);
    }

    if let Some(kind) = first_match(&ID_RULES, &lower) {
        return Some(kind);
    }

    if contains_any(&lower, ID_FRONT_MATTER) {
        Some(SectionKind::FrontMatter)
    } else if contains_any(&lower, ID_BACK_MATTER) {
        Some(SectionKind::BackMatter)
    } else if contains_any(&lower, ID_CONTENTS) {
        Some(SectionKind::Toc)
    } else {
        None
    }
}

/// Classify the text of a heading.
pub fn classify_heading(text: &str) -> Option<SectionKind> {
    let normalized = normalize_heading(text);

    if let Some(kind) = first_match(&HEADING_RULES, &normalized) {
        return Some(kind);
    }

    for keyword in HEADING_FRONT_MATTER {
        let matched = normalized == *keyword
            || normalized.starts_with(&format!("{keyword} "))
            || normalized.ends_with(&format!(" {keyword}"));
        if matched {
            if keyword.contains("content") || keyword.contains("table") {
                return Some(SectionKind::Toc);
            }
            return Some(SectionKind::FrontMatter);
        }
    }

    let is_back_matter = HEADING_BACK_MATTER
        .iter()
        .any(|keyword| normalized == *keyword || normalized.starts_with(&format!("{keyword} ")));
    is_back_matter.then_some(SectionKind::BackMatter)
}

/// Strip markup, collapse whitespace and lowercase heading text.
pub fn normalize_heading(text: &str) -> String {
    let without_tags = RE_TAG.replace_all(text, "");
    collapse_whitespace(&without_tags).to_lowercase()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
