//! Segment Project Gutenberg HTML books into front matter and chapters and
//! convert them to Markdown.
//!
//! The core is [`extract::extract`]: boilerplate stripping, table-of-contents
//! anchor discovery and a single-pass segmenting converter over an html5ever
//! token stream, with a whole-document fallback.

pub mod boilerplate;
pub mod classify;
pub mod cli;
pub mod converter;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod html_reader;
pub mod image;
pub mod markdown;
pub mod metadata;
pub mod section;
pub mod segmenter;
pub mod tag;
pub mod toc;

pub use error::{ExtractError, Result};
pub use extract::{extract, ExtractOptions, Extraction};
pub use section::{Section, SectionKind};
