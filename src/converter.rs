use crate::cli::Cli;
use crate::extract::{ExtractOptions, Extraction};
use crate::html_reader::HtmlBook;
use crate::image::{self, ImageRef};
use crate::markdown;
use crate::metadata::{self, BookMetadata};
use crate::section::{Section, SectionKind};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

const MAX_FILENAME_LENGTH: usize = 50;

static RE_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static RE_RESERVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("valid reserved char regex"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Everything needed to write one book to disk.
pub struct ConvertedBook {
    pub metadata: BookMetadata,
    pub extraction: Extraction,
    pub images: Vec<ImageRef>,
}

#[derive(Serialize)]
struct SectionFrontMatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    byline: Option<&'a str>,
    order: usize,
    section_type: SectionKind,
}

#[derive(Serialize)]
struct BookData<'a> {
    #[serde(flatten)]
    metadata: &'a BookMetadata,
    front_matter_count: usize,
    chapter_count: usize,
    total_sections: usize,
    whole_document: bool,
    files: &'a [String],
    images: &'a [ImageRef],
}

pub fn convert(cli: &Cli) -> Result<()> {
    let book = HtmlBook::open(&cli.input)?;
    let output_path = resolve_output_path(cli)?;

    let mut metadata = book.metadata();
    if cli.title.is_some() {
        metadata.title = cli.title.clone();
    }

    let options = ExtractOptions {
        end_marker_guard: cli.end_marker_guard,
        fallback_title: metadata.title.clone(),
    };
    let extraction = book.extract(&options)?;

    let images = if cli.no_images {
        Vec::new()
    } else {
        let base = resolve_base_url(cli)?;
        image::resolve_images(&extraction.images, base.as_ref())
    };

    let converted = ConvertedBook {
        metadata,
        extraction,
        images,
    };

    if cli.single {
        write_single_file(&output_path, &converted)?;
    } else {
        write_folder(&output_path, &converted)?;
    }

    let image_count = converted.images.len();
    log::info!(
        "Converted {} front matter sections and {} chapters{} to {}",
        converted.extraction.front_matter.len(),
        converted.extraction.chapters.len(),
        if image_count > 0 {
            format!(" with {} images", image_count)
        } else {
            String::new()
        },
        output_path.display()
    );

    Ok(())
}

fn resolve_output_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref path) = cli.output {
        return Ok(path.clone());
    }

    let stem = cli
        .input
        .file_stem()
        .context("Input file has no name")?
        .to_string_lossy();

    if cli.single {
        Ok(PathBuf::from(format!("{}.md", stem)))
    } else {
        Ok(PathBuf::from(stem.as_ref()))
    }
}

/// Base for relative image references: `--base-url`, else the input file.
fn resolve_base_url(cli: &Cli) -> Result<Option<Url>> {
    if let Some(ref base) = cli.base_url {
        let url = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
        return Ok(Some(url));
    }

    let absolute = fs::canonicalize(&cli.input)
        .with_context(|| format!("Failed to resolve input path: {}", cli.input.display()))?;
    Ok(Url::from_file_path(absolute).ok())
}

/// Turn a section title into a safe, lowercase file name stem.
pub fn sanitize_filename(text: &str) -> String {
    let text = RE_TAGS.replace_all(text, "");
    let text = html_escape::decode_html_entities(&text);
    let text = RE_RESERVED.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, "-");
    let mut slug = text.to_lowercase().trim_matches('-').to_string();

    if slug.chars().count() > MAX_FILENAME_LENGTH {
        let truncated: String = slug.chars().take(MAX_FILENAME_LENGTH).collect();
        slug = match truncated.rsplit_once('-') {
            Some((head, _)) => head.to_string(),
            None => truncated,
        };
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// File names for every section: `00-NN-` for front matter, `NN-` for chapters.
fn section_filenames(extraction: &Extraction) -> Vec<String> {
    let front = extraction
        .front_matter
        .iter()
        .enumerate()
        .map(|(i, s)| format!("00-{:02}-{}.md", i + 1, sanitize_filename(&s.title)));
    let chapters = extraction
        .chapters
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{:02}-{}.md", i + 1, sanitize_filename(&s.title)));
    front.chain(chapters).collect()
}

fn section_file(section: &Section, metadata: &BookMetadata, order: usize) -> Result<String> {
    let front_matter = SectionFrontMatter {
        title: &section.title,
        byline: metadata.author.as_deref(),
        order,
        section_type: section.kind,
    };
    let yaml = serde_yaml::to_string(&front_matter)
        .with_context(|| format!("Failed to serialize front matter for {}", section.id))?;
    Ok(format!(
        "---\n{}---\n\n{}",
        yaml,
        markdown::clean_markdown(&section.content)
    ))
}

pub fn write_single_file(output_path: &Path, book: &ConvertedBook) -> Result<()> {
    let mut content = String::new();

    content.push_str(&metadata::format_metadata(&book.metadata));

    for (i, section) in book.extraction.sections().enumerate() {
        if i > 0 {
            content.push_str("\n---\n\n");
        }
        content.push_str(&section.content);
        content.push('\n');
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output_path, markdown::clean_markdown(&content))
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    Ok(())
}

/// Write one Markdown file per section plus `000-data.yml` and `README.md`.
///
/// Returns the section file names in order.
pub fn write_folder(output_dir: &Path, book: &ConvertedBook) -> Result<Vec<String>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let filenames = section_filenames(&book.extraction);

    for (order, (section, filename)) in book.extraction.sections().zip(&filenames).enumerate() {
        let path = output_dir.join(filename);
        let content = section_file(section, &book.metadata, order + 1)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write section: {}", path.display()))?;
        log::debug!("wrote {}", filename);
    }

    let extraction = &book.extraction;
    let data = BookData {
        metadata: &book.metadata,
        front_matter_count: extraction.front_matter.len(),
        chapter_count: extraction.chapters.len(),
        total_sections: extraction.section_count(),
        whole_document: extraction.whole_document,
        files: &filenames,
        images: &book.images,
    };
    let yaml = serde_yaml::to_string(&data).context("Failed to serialize book data")?;
    fs::write(output_dir.join("000-data.yml"), format!("# Book Metadata\n{}", yaml))
        .with_context(|| "Failed to write 000-data.yml")?;

    fs::write(output_dir.join("README.md"), readme(book, &filenames))
        .with_context(|| "Failed to write README.md")?;

    Ok(filenames)
}

fn readme(book: &ConvertedBook, filenames: &[String]) -> String {
    let mut readme = String::new();
    let title = book.metadata.title.as_deref().unwrap_or("Unknown");
    readme.push_str(&format!("# {}\n\n", title));
    if let Some(ref author) = book.metadata.author {
        readme.push_str(&format!("*by {}*\n\n", author));
    }
    readme.push_str("## Contents\n\n");

    let front_count = book.extraction.front_matter.len();
    let mut entries = book.extraction.sections().zip(filenames);

    if front_count > 0 {
        readme.push_str("### Front Matter\n\n");
        for (section, filename) in entries.by_ref().take(front_count) {
            readme.push_str(&format!("- [{}]({})\n", section.title, filename));
        }
        readme.push('\n');
    }

    readme.push_str("### Chapters\n\n");
    for (section, filename) in entries {
        readme.push_str(&format!("- [{}]({})\n", section.title, filename));
    }

    readme
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, kind: SectionKind, title: &str, content: &str) -> Section {
        Section {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    fn sample_book() -> ConvertedBook {
        ConvertedBook {
            metadata: BookMetadata {
                title: Some("Frankenstein".to_string()),
                author: Some("Mary Shelley".to_string()),
                authors: vec!["Mary Shelley".to_string()],
                ..BookMetadata::default()
            },
            extraction: Extraction {
                front_matter: vec![section(
                    "preface",
                    SectionKind::FrontMatter,
                    "Preface",
                    "## Preface\n\nThe event on which this fiction is founded.",
                )],
                chapters: vec![
                    section("letter-1", SectionKind::Chapter, "Letter 1", "## Letter 1\n\nTo Mrs. Saville."),
                    section("chap01", SectionKind::Chapter, "Chapter 1", "## Chapter 1\n\nI am by birth a Genevese."),
                ],
                images: Vec::new(),
                whole_document: false,
            },
            images: Vec::new(),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Chapter I."), "chapter-i.");
        assert_eq!(sanitize_filename("<em>What?</em> A &amp; B"), "what-a-&-b");
        assert_eq!(sanitize_filename("  "), "untitled");
        assert_eq!(sanitize_filename(""), "untitled");
        let long = "a very long title that goes on and on well past the limit of names";
        let slug = sanitize_filename(long);
        assert!(slug.chars().count() <= MAX_FILENAME_LENGTH);
        assert_eq!(slug, "a-very-long-title-that-goes-on-and-on-well-past");
    }

    #[test]
    fn test_write_folder_layout() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_folder(dir.path(), &sample_book()).unwrap();
        assert_eq!(
            files,
            vec!["00-01-preface.md", "01-letter-1.md", "02-chapter-1.md"]
        );

        let chapter = fs::read_to_string(dir.path().join("02-chapter-1.md")).unwrap();
        assert!(chapter.starts_with("---\ntitle: Chapter 1\nbyline: Mary Shelley\norder: 3\nsection_type: chapter\n---\n\n## Chapter 1"));
        assert!(chapter.ends_with("Genevese.\n"));

        let data = fs::read_to_string(dir.path().join("000-data.yml")).unwrap();
        assert!(data.starts_with("# Book Metadata\n"));
        assert!(data.contains("title: Frankenstein"));
        assert!(data.contains("chapter_count: 2"));
        assert!(data.contains("- 00-01-preface.md"));

        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.starts_with("# Frankenstein\n\n*by Mary Shelley*\n\n## Contents"));
        assert!(readme.contains("### Front Matter\n\n- [Preface](00-01-preface.md)\n\n### Chapters"));
        assert!(readme.contains("- [Letter 1](01-letter-1.md)\n- [Chapter 1](02-chapter-1.md)\n"));
    }

    #[test]
    fn test_write_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/book.md");
        write_single_file(&path, &sample_book()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Frankenstein\n\n**Author:** Mary Shelley\n\n---\n\n## Preface"));
        assert!(content.contains("founded.\n\n---\n\n## Letter 1"));
        assert!(content.ends_with("Genevese.\n"));
    }

    #[test]
    fn test_convert_from_cli() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pg84.html");
        fs::write(
            &input,
            "<html><head><meta name=\"dc.title\" content=\"Frankenstein\"></head><body>\
             <h2 id=\"chap01\">Chapter 1</h2><p>Text <img src=\"images/plate.jpg\" alt=\"Plate\"></p>\
             </body></html>",
        )
        .unwrap();
        let output = dir.path().join("out");

        let cli = Cli {
            input,
            output: Some(output.clone()),
            single: false,
            no_images: false,
            base_url: Some("https://www.gutenberg.org/files/84/84-h/84-h.htm".to_string()),
            end_marker_guard: crate::boilerplate::DEFAULT_END_MARKER_GUARD,
            title: None,
            verbose: false,
        };
        convert(&cli).unwrap();

        assert!(output.join("01-chapter-1.md").exists());
        let data = fs::read_to_string(output.join("000-data.yml")).unwrap();
        assert!(data.contains("https://www.gutenberg.org/files/84/84-h/images/plate.jpg"));
        assert!(data.contains("file_name: plate.jpg"));
        assert!(data.contains("alt: Plate"));
    }
}
