//! Table-of-contents anchor discovery.
//!
//! A book's contents block links to the internal anchors where its sections
//! start. Those anchors are the strongest boundary signal the segmenter has.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static RE_TOC_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:div|nav|section)[^>]*(?:class|id)=["'][^"']*(?:toc|contents)[^"']*["'][^>]*>.*?</(?:div|nav|section)>"#,
    )
    .expect("valid toc container regex")
});
static RE_CONTENTS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h[1-4][^>]*>.*?(?:contents|table of contents).*?</h[1-4]>")
        .expect("valid contents heading regex")
});
static RE_HEADING_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-4]").expect("valid heading open regex"));
static RE_INTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]+href=["']#([^"']+)["'][^>]*>"#).expect("valid internal link regex")
});

/// Anchors that point at notes or boilerplate rather than sections
const ANCHOR_DENYLIST: &[&str] = &["note", "footnote", "pg-", "gutenberg"];

/// Anchor identifiers linked from the table of contents, in order of first
/// appearance and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocAnchors {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl TocAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an anchor; returns `false` if it was already present.
    pub fn insert(&mut self, anchor: impl Into<String>) -> bool {
        let anchor = anchor.into();
        if self.lookup.contains(&anchor) {
            return false;
        }
        self.lookup.insert(anchor.clone());
        self.ordered.push(anchor);
        true
    }

    pub fn contains(&self, anchor: &str) -> bool {
        self.lookup.contains(anchor)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TocAnchors {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut anchors = TocAnchors::new();
        for anchor in iter {
            anchors.insert(anchor);
        }
        anchors
    }
}

/// Collect the internal link targets of the document's contents block.
///
/// The block is either a `div`/`nav`/`section` labelled `toc` or `contents`,
/// or a heading mentioning "contents" up to the next heading. When neither is
/// found the whole document is scanned.
pub fn extract_toc_anchors(html: &str) -> TocAnchors {
    let scope = find_toc_scope(html).unwrap_or(html);

    let anchors: TocAnchors = RE_INTERNAL_LINK
        .captures_iter(scope)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|anchor| {
            let lower = anchor.to_lowercase();
            !ANCHOR_DENYLIST.iter().any(|skip| lower.contains(skip))
        })
        .collect();

    log::debug!("collected {} table-of-contents anchors", anchors.len());
    anchors
}

fn find_toc_scope(html: &str) -> Option<&str> {
    if let Some(m) = RE_TOC_CONTAINER.find(html) {
        return Some(m.as_str());
    }

    // The contents heading only counts when another heading follows it.
    let heading = RE_CONTENTS_HEADING.find(html)?;
    let next = RE_HEADING_OPEN.find_at(html, heading.end())?;
    Some(&html[heading.start()..next.start()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(html: &str) -> Vec<String> {
        extract_toc_anchors(html).iter().map(str::to_string).collect()
    }

    #[test]
    fn test_labelled_container_scopes_search() {
        let html = r##"<div id="toc"><a href="#ch1">I</a><a href="#ch2">II</a></div>
            <p>See <a href="#elsewhere">here</a>.</p>"##;
        assert_eq!(anchors(html), vec!["ch1", "ch2"]);
    }

    #[test]
    fn test_contents_heading_scopes_until_next_heading() {
        let html = r##"<h2>Contents</h2>
            <p><a href="#preface">Preface</a></p>
            <p><a href="#chap01">Chapter I</a></p>
            <h2 id="preface">Preface</h2>
            <p><a href="#chap01">back</a><a href="#later">later</a></p>"##;
        assert_eq!(anchors(html), vec!["preface", "chap01"]);
    }

    #[test]
    fn test_contents_heading_without_following_heading_scans_document() {
        let html = r##"<h2>Contents</h2><a href="#a">A</a><p><a href="#b">B</a></p>"##;
        assert_eq!(anchors(html), vec!["a", "b"]);
    }

    #[test]
    fn test_deduplicates_and_skips_denylisted() {
        let html = r##"<nav class="contents">
            <a href="#ch1">1</a><a href="#Footnote_3">3</a><a href="#ch1">1 again</a>
            <a href="#pg-header">header</a><a href='#ch2'>2</a>
            </nav>"##;
        assert_eq!(anchors(html), vec!["ch1", "ch2"]);
    }

    #[test]
    fn test_no_links_is_empty() {
        let toc = extract_toc_anchors("<p>No links at all.</p>");
        assert!(toc.is_empty());
        assert!(!toc.contains("anything"));
    }

    #[test]
    fn test_collect_keeps_first_appearance_order() {
        let toc: TocAnchors = ["b", "a", "b", "c"].into_iter().collect();
        assert_eq!(toc.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert!(toc.contains("a"));
    }
}
