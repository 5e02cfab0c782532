//! Book metadata from Dublin Core `<meta>` tags, the `<title>` element and
//! the plain-text header that precedes most Gutenberg books.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RE_DC_TITLE: LazyLock<Regex> = LazyLock::new(|| dc_meta("title"));
static RE_DC_CREATOR: LazyLock<Regex> = LazyLock::new(|| dc_meta("creator"));
static RE_DC_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| dc_meta("language"));
static RE_DC_RIGHTS: LazyLock<Regex> = LazyLock::new(|| dc_meta("rights"));
static RE_DC_SUBJECT: LazyLock<Regex> = LazyLock::new(|| dc_meta("subject"));
static RE_TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title>([^<]+)</title>").expect("valid title regex"));
static RE_TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)The Project Gutenberg eBook of\s+").expect("valid title prefix regex")
});
static RE_TITLE_BYLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),?\s*\bby\s+.*$").expect("valid byline regex"));
static RE_LIFE_DATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]+\)\s*$").expect("valid life dates regex"));

// -- Plain-text header patterns --
static RE_HEADER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Title:\s*(.+?)(?:\n|Author:|Release)").expect("valid header title regex")
});
static RE_HEADER_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Author:\s*(.+?)(?:\n|\r|Release|Illustrator|Editor|Translator)")
        .expect("valid header author regex")
});
static RE_HEADER_LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Language:\s*(\w+)").expect("valid header language regex"));
static RE_HEADER_EBOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:EBook|E-?text)\s*#?(\d+)\]").expect("valid header ebook regex")
});
static RE_HEADER_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Release Date:\s*(.+?)(?:\s*\[|\n|\r)").expect("valid header release regex")
});
static RE_HEADER_POSTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Posting Date:\s*(.+?)(?:\s*\[|\n|\r)").expect("valid header posting regex")
});

/// Only the first lines of a book carry the plain-text header.
const HEADER_LINES: usize = 150;

fn dc_meta(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i)<meta\s+name="dc\.{name}"\s+content="([^"]+)""#))
        .expect("valid dublin core regex")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebook_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl BookMetadata {
    /// Extract metadata from a whole HTML document.
    ///
    /// `<meta>` tags win; the plain-text header only fills what they leave
    /// empty.
    pub fn from_html(html: &str) -> Self {
        let mut metadata = Self::from_meta_tags(html);
        metadata.fill_from(Self::from_header_text(html));
        metadata
    }

    fn from_meta_tags(html: &str) -> Self {
        let mut metadata = Self {
            title: first_capture(&RE_DC_TITLE, html),
            language: first_capture(&RE_DC_LANGUAGE, html),
            rights: first_capture(&RE_DC_RIGHTS, html),
            subjects: RE_DC_SUBJECT
                .captures_iter(html)
                .map(|caps| unescape(&caps[1]))
                .collect(),
            ..Self::default()
        };

        if let Some(author) = first_capture(&RE_DC_CREATOR, html) {
            let author = strip_life_dates(&author);
            metadata.authors.push(author.clone());
            metadata.author = Some(author);
        }

        if metadata.title.is_none() {
            metadata.title = first_capture(&RE_TITLE_TAG, html).map(|title| {
                let title = RE_TITLE_PREFIX.replace(&title, "");
                RE_TITLE_BYLINE.replace(&title, "").trim().to_string()
            });
        }

        metadata
    }

    fn from_header_text(html: &str) -> Self {
        let header = html.split('\n').take(HEADER_LINES).collect::<Vec<_>>().join("\n");
        let author = header_field(&RE_HEADER_AUTHOR, &header).map(|author| strip_life_dates(&author));
        Self {
            title: header_field(&RE_HEADER_TITLE, &header),
            authors: author.iter().cloned().collect(),
            author,
            language: header_field(&RE_HEADER_LANGUAGE, &header).map(|lang| iso_language(&lang)),
            ebook_id: header_field(&RE_HEADER_EBOOK, &header),
            release_date: header_field(&RE_HEADER_RELEASE, &header)
                .or_else(|| header_field(&RE_HEADER_POSTING, &header)),
            ..Self::default()
        }
    }

    /// Fill empty fields from `other`.
    fn fill_from(&mut self, other: Self) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.title, other.title);
        fill(&mut self.author, other.author);
        fill(&mut self.language, other.language);
        fill(&mut self.rights, other.rights);
        fill(&mut self.ebook_id, other.ebook_id);
        fill(&mut self.release_date, other.release_date);
        if self.authors.is_empty() {
            self.authors = other.authors;
        }
        if self.subjects.is_empty() {
            self.subjects = other.subjects;
        }
    }
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html).map(|caps| unescape(&caps[1]))
}

fn header_field(re: &Regex, header: &str) -> Option<String> {
    re.captures(header).map(|caps| caps[1].trim().to_string())
}

fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn strip_life_dates(author: &str) -> String {
    RE_LIFE_DATES.replace(author, "").to_string()
}

fn iso_language(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "english" => "en",
        "french" => "fr",
        "german" => "de",
        "spanish" => "es",
        "italian" => "it",
        other => other,
    }
    .to_string()
}

/// Markdown header block placed before combined output.
pub fn format_metadata(metadata: &BookMetadata) -> String {
    let mut lines = Vec::new();

    if let Some(ref title) = metadata.title {
        lines.push(format!("# {}", title));
        lines.push(String::new());
    }

    if !metadata.authors.is_empty() {
        lines.push(format!("**Author:** {}", metadata.authors.join(", ")));
    }

    if let Some(ref language) = metadata.language {
        lines.push(format!("**Language:** {}", language));
    }

    if let Some(ref release_date) = metadata.release_date {
        lines.push(format!("**Released:** {}", release_date));
    }

    if let Some(ref ebook_id) = metadata.ebook_id {
        lines.push(format!("**Project Gutenberg EBook:** #{}", ebook_id));
    }

    if !lines.is_empty() {
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }

    let result = lines.join("\n");
    // Ensure the metadata block ends with a trailing newline
    if result.is_empty() {
        result
    } else {
        result + "\n"
    }
}
