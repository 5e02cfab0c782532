use clap::Parser;
use std::path::PathBuf;

use crate::boilerplate::DEFAULT_END_MARKER_GUARD;

/// Convert Project Gutenberg HTML books to sectioned Markdown
#[derive(Parser, Debug)]
#[command(name = "gutenberg2md", version, about)]
pub struct Cli {
    /// Path to the input HTML file
    pub input: PathBuf,

    /// Output path (directory for folder mode, file for single-file mode).
    /// Defaults to a directory or file named after the HTML file in the current directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output as a single combined Markdown file instead of a directory of section files
    #[arg(short, long, default_value_t = false)]
    pub single: bool,

    /// Do not record image references
    #[arg(long, default_value_t = false)]
    pub no_images: bool,

    /// Base URL for resolving relative image references.
    /// Defaults to the input file's location.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Line number from which end-of-book markers are honoured
    #[arg(long, default_value_t = DEFAULT_END_MARKER_GUARD)]
    pub end_marker_guard: usize,

    /// Override the book title
    #[arg(long)]
    pub title: Option<String>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
