use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// An `<img>` as found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub src: String,
    pub alt: String,
}

/// One image referenced by the book, resolved against the document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Reference as written in the `src` attribute
    pub src: String,
    /// Absolute location, or the raw reference when it cannot be resolved
    pub url: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alt: String,
}

/// Resolve raw `<img>` references into image records.
///
/// Inline `data:` images are skipped and records are deduplicated by their
/// resolved location, keeping document order and the first alt text.
pub fn resolve_images(sources: &[RawImage], base: Option<&Url>) -> Vec<ImageRef> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for raw in sources {
        let src = raw.src.trim();
        if src.is_empty() || src.starts_with("data:") {
            continue;
        }

        let url = match base {
            Some(base) => base
                .join(src)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| src.to_string()),
            None => Url::parse(src)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| src.to_string()),
        };

        if !seen.insert(url.clone()) {
            continue;
        }

        images.push(ImageRef {
            src: src.to_string(),
            file_name: clean_filename(&url),
            url,
            alt: raw.alt.trim().to_string(),
        });
    }

    log::debug!("Resolved {} unique images from {} references", images.len(), sources.len());
    images
}

fn clean_filename(location: &str) -> String {
    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.split(['?', '#']).next().unwrap_or(location).to_string(),
    };
    Path::new(&path)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.bin".to_string())
}
