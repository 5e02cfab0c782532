use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::extract::{self, ExtractOptions, Extraction};
use crate::metadata::BookMetadata;

/// A Gutenberg HTML book loaded into memory.
pub struct HtmlBook {
    html: String,
}

impl HtmlBook {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read HTML: {}", path.display()))?;
        // Older books mix encodings; keep going on stray bytes
        let html = String::from_utf8_lossy(&bytes).into_owned();
        log::debug!("Loaded {} ({} bytes)", path.display(), html.len());
        Ok(Self { html })
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn metadata(&self) -> BookMetadata {
        BookMetadata::from_html(&self.html)
    }

    /// Run section extraction. Without an explicit fallback title the book's
    /// own title names the whole-document section.
    pub fn extract(&self, options: &ExtractOptions) -> Result<Extraction> {
        let mut options = options.clone();
        if options.fallback_title.is_none() {
            options.fallback_title = self.metadata().title;
        }
        extract::extract(&self.html, &options).context("Failed to extract book content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_tolerates_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<h2 id=\"chapter-1\">Chapter I</h2><p>caf\xe9</p>").unwrap();

        let book = HtmlBook::open(file.path()).unwrap();
        assert!(book.html().contains("caf\u{fffd}"));
        let extraction = book.extract(&ExtractOptions::default()).unwrap();
        assert_eq!(extraction.chapters[0].id, "chapter-1");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = HtmlBook::open(Path::new("/nonexistent/book.html")).err().unwrap();
        assert!(err.to_string().contains("Failed to read HTML"));
    }

    #[test]
    fn test_fallback_section_is_named_after_book() {
        let book = HtmlBook::from_html(
            "<html><head><meta name=\"dc.title\" content=\"Moby Dick\"></head>\
             <body><p>Call me Ishmael.</p></body></html>",
        );
        let extraction = book.extract(&ExtractOptions::default()).unwrap();
        assert!(extraction.whole_document);
        assert_eq!(extraction.chapters[0].title, "Moby Dick");
    }
}
