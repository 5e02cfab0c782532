/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors surfaced by the extraction core
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Neither the segmenting pass nor the whole-document pass produced text
    #[error("no content could be extracted from the document")]
    NoContent,
}
