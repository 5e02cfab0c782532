//! The extraction pipeline: anchors, boilerplate stripping, segmentation and
//! the whole-document fallback.

use crate::boilerplate::{self, DEFAULT_END_MARKER_GUARD};
use crate::error::{ExtractError, Result};
use crate::fallback;
use crate::image::RawImage;
use crate::section::Section;
use crate::segmenter;
use crate::toc;

pub const DEFAULT_FALLBACK_TITLE: &str = "Full Text";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// First line at which an end-of-text marker is honoured
    pub end_marker_guard: usize,
    /// Title of the single section produced by the fallback conversion
    pub fallback_title: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            end_marker_guard: DEFAULT_END_MARKER_GUARD,
            fallback_title: None,
        }
    }
}

/// Result of extracting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub front_matter: Vec<Section>,
    /// Chapters and back matter, in document order
    pub chapters: Vec<Section>,
    /// Raw image references, in document order
    pub images: Vec<RawImage>,
    /// True when no sections were found and the whole document became one
    pub whole_document: bool,
}

impl Extraction {
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.front_matter.iter().chain(self.chapters.iter())
    }

    pub fn section_count(&self) -> usize {
        self.front_matter.len() + self.chapters.len()
    }
}

/// Segment `html` into front matter and chapters.
///
/// Falls back to converting the whole document into a single section when no
/// section boundary is recognized.
///
/// # Errors
///
/// Returns [`ExtractError::NoContent`] if not even the fallback conversion
/// yields any text.
pub fn extract(html: &str, options: &ExtractOptions) -> Result<Extraction> {
    let anchors = toc::extract_toc_anchors(html);
    if !anchors.is_empty() {
        log::info!("Found {} TOC anchor links", anchors.len());
    }

    let stripped = boilerplate::strip_boilerplate(html, options.end_marker_guard);
    log::info!(
        "Removed boilerplate: {} -> {} chars",
        html.len(),
        stripped.len()
    );

    let segmentation = segmenter::segment(stripped, &anchors);
    log::info!(
        "Found {} front matter sections and {} chapters",
        segmentation.front_matter.len(),
        segmentation.chapters.len()
    );

    if !segmentation.is_empty() {
        return Ok(Extraction {
            front_matter: segmentation.front_matter,
            chapters: segmentation.chapters,
            images: segmentation.images,
            whole_document: false,
        });
    }

    log::warn!("No chapters detected, extracting as a single document");
    let title = options
        .fallback_title
        .as_deref()
        .unwrap_or(DEFAULT_FALLBACK_TITLE);
    let section = fallback::convert_whole(html, title).ok_or(ExtractError::NoContent)?;

    Ok(Extraction {
        front_matter: Vec::new(),
        chapters: vec![section],
        images: segmentation.images,
        whole_document: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionKind;

    #[test]
    fn test_boilerplate_lines_never_reach_sections() {
        let html = "<p>Title: Header junk</p>\n\
            <p>*** START OF THE PROJECT GUTENBERG EBOOK X ***</p>\n\
            <h2>Chapter I</h2>\n<p>Body.</p>";
        let extraction = extract(html, &ExtractOptions::default()).unwrap();
        assert!(!extraction.whole_document);
        assert_eq!(extraction.chapters.len(), 1);
        assert!(!extraction.chapters[0].content.contains("junk"));
    }

    #[test]
    fn test_fallback_uses_configured_title() {
        let options = ExtractOptions {
            fallback_title: Some("Moby Dick".to_string()),
            ..ExtractOptions::default()
        };
        let extraction = extract("<p>Call me Ishmael.</p>", &options).unwrap();
        assert!(extraction.whole_document);
        assert_eq!(extraction.chapters[0].title, "Moby Dick");
        assert_eq!(extraction.chapters[0].kind, SectionKind::Chapter);
    }

    #[test]
    fn test_fallback_default_title() {
        let extraction = extract("<p>text</p>", &ExtractOptions::default()).unwrap();
        assert_eq!(extraction.chapters[0].title, DEFAULT_FALLBACK_TITLE);
        assert_eq!(extraction.section_count(), 1);
    }

    #[test]
    fn test_no_content_is_an_error() {
        let err = extract("<html><body></body></html>", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::NoContent));
    }
}
