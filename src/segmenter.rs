//! Single-pass section segmentation and Markdown conversion.
//!
//! The segmenter consumes the event stream of the boilerplate-stripped
//! document. At each event it decides, from element ids, table-of-contents
//! anchors and heading text, whether a new section begins, while converting
//! inline formatting of the open section to Markdown. At most one section is
//! open at a time; opening a new one always finalizes the previous one.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::{classify_heading, classify_id, collapse_whitespace};
use crate::image::RawImage;
use crate::markdown;
use crate::section::{OpenSection, Section, SectionKind};
use crate::tag::{self, Element, EventHandler, OpenTag};
use crate::toc::TocAnchors;

const BOILERPLATE_CLASS: &str = "pg-boilerplate";
const PAGE_NUMBER_CLASS: &str = "pagenum";
const MAX_SLUG_LENGTH: usize = 50;

static RE_NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Mutually exclusive suppression modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Inside a boilerplate container; `depth` counts nested containers.
    Boilerplate { depth: usize },
    /// After a table-of-contents boundary, until the next boundary.
    Toc,
    /// Inside an inline page-number annotation.
    PageNumber { within_toc: bool },
}

/// Heading whose text is still being collected.
#[derive(Debug)]
struct HeadingCapture {
    level: u8,
    text: String,
    /// Boundary decided from the heading's own id when it opened.
    pending: Option<(String, SectionKind)>,
}

/// Sections produced by one segmentation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub front_matter: Vec<Section>,
    /// Chapter and back-matter sections in document order.
    pub chapters: Vec<Section>,
    /// Every image encountered outside boilerplate.
    pub images: Vec<RawImage>,
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        self.front_matter.is_empty() && self.chapters.is_empty()
    }
}

/// Split `html` into sections using `toc_anchors` as the strongest signal.
pub fn segment(html: &str, toc_anchors: &TocAnchors) -> Segmentation {
    tag::drive(html, Segmenter::new(toc_anchors)).finish()
}

pub struct Segmenter<'a> {
    toc_anchors: &'a TocAnchors,
    tag_stack: Vec<String>,
    mode: Mode,
    current: Option<OpenSection>,
    /// Inline text of the block element being converted.
    inline: String,
    heading: Option<HeadingCapture>,
    sections: Vec<Section>,
    images: Vec<RawImage>,
}

impl<'a> Segmenter<'a> {
    pub fn new(toc_anchors: &'a TocAnchors) -> Self {
        Self {
            toc_anchors,
            tag_stack: Vec::new(),
            mode: Mode::Normal,
            current: None,
            inline: String::new(),
            heading: None,
            sections: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Finalize the open section and partition the results.
    pub fn finish(mut self) -> Segmentation {
        self.finalize_current();
        if !self.tag_stack.is_empty() {
            log::debug!("{} unclosed tags left at end of document", self.tag_stack.len());
        }

        let mut result = Segmentation {
            images: self.images,
            ..Segmentation::default()
        };
        for section in self.sections {
            match section.kind {
                SectionKind::FrontMatter => result.front_matter.push(section),
                SectionKind::Chapter | SectionKind::BackMatter => result.chapters.push(section),
                SectionKind::Toc => {}
            }
        }

        log::debug!(
            "segmented {} front matter and {} chapter sections",
            result.front_matter.len(),
            result.chapters.len()
        );
        result
    }

    fn suppressed(&self) -> bool {
        self.mode != Mode::Normal
    }

    fn in_boilerplate(&self) -> bool {
        matches!(self.mode, Mode::Boilerplate { .. })
    }

    fn finalize_current(&mut self) {
        if let Some(section) = self.current.take().and_then(OpenSection::finalize) {
            self.sections.push(section);
        }
    }

    /// Close whatever is open and start a section of `kind`, or enter
    /// table-of-contents suppression.
    fn begin_boundary(&mut self, id: String, kind: SectionKind, heading: Option<(u8, String)>) {
        self.finalize_current();

        if kind == SectionKind::Toc {
            log::debug!("suppressing table of contents at {id:?}");
            if !self.in_boilerplate() {
                self.mode = Mode::Toc;
            }
            return;
        }

        if self.mode == Mode::Toc {
            self.mode = Mode::Normal;
        }
        log::debug!("{} boundary at {id:?}", kind.as_str());

        let section = match heading {
            Some((level, title)) => {
                let mut section = OpenSection::new(id, kind, Some(title.clone()));
                if !title.is_empty() {
                    section.push(markdown::heading_line(level, &title));
                }
                section
            }
            None => OpenSection::new(id, kind, None),
        };
        // A boundary found mid-paragraph starts the section with a clean buffer.
        self.inline.clear();
        self.current = Some(section);
    }

    fn open_heading(&mut self, level: u8, tag: &OpenTag) {
        self.inline.clear();
        let pending = tag
            .id()
            .and_then(|id| classify_id(id, self.toc_anchors).map(|kind| (id.to_string(), kind)));
        self.heading = Some(HeadingCapture {
            level,
            text: String::new(),
            pending,
        });
    }

    fn close_heading(&mut self, capture: HeadingCapture) {
        let text = collapse_whitespace(&capture.text);
        self.inline.clear();

        // Heading text inside boilerplate never opens a section.
        let in_boilerplate = self.in_boilerplate();
        let boundary = capture.pending.or_else(|| {
            if in_boilerplate {
                return None;
            }
            classify_heading(&text).map(|kind| (self.heading_id(&text), kind))
        });

        if let Some((id, kind)) = boundary {
            self.begin_boundary(id, kind, Some((capture.level, text)));
            return;
        }

        if text.is_empty() || in_boilerplate {
            return;
        }
        if let Some(section) = self.current.as_mut() {
            section.push(markdown::heading_line(capture.level, &text));
            if section.title.as_deref().map_or(true, str::is_empty) {
                section.title = Some(text);
            }
        }
    }

    /// Identifier for a section found by heading text alone.
    fn heading_id(&self, text: &str) -> String {
        let slug = slugify(text);
        if slug.is_empty() {
            format!("section-{}", self.sections.len() + 1)
        } else {
            slug
        }
    }

    fn open_formatting(&mut self, element: Element) {
        match element {
            Element::Paragraph | Element::BlockQuote => self.inline.clear(),
            Element::ListItem => {
                self.inline.clear();
                self.inline.push_str(markdown::LIST_BULLET);
            }
            Element::Emphasis => self.inline.push_str(markdown::EMPHASIS),
            Element::Strong => self.inline.push_str(markdown::STRONG),
            Element::LineBreak => self.inline.push_str(markdown::LINE_BREAK),
            Element::Rule => {
                if let Some(section) = self.current.as_mut() {
                    section.push(markdown::rule());
                }
            }
            _ => {}
        }
    }

    fn close_formatting(&mut self, element: Element) {
        let Some(section) = self.current.as_mut() else {
            return;
        };

        match element {
            Element::Paragraph => {
                let content = self.inline.trim();
                if !content.is_empty() {
                    section.push(format!("{content}{}", markdown::PARAGRAPH_BREAK));
                }
                self.inline.clear();
            }
            Element::BlockQuote => {
                let content = self.inline.trim();
                if !content.is_empty() {
                    section.push(markdown::quote_block(content));
                }
                self.inline.clear();
            }
            Element::ListItem => {
                let content = self.inline.trim();
                if !content.is_empty() {
                    section.push(format!("{content}\n"));
                }
                self.inline.clear();
            }
            Element::List => section.push("\n"),
            Element::Emphasis => self.inline.push_str(markdown::EMPHASIS),
            Element::Strong => self.inline.push_str(markdown::STRONG),
            _ => {}
        }
    }
}

impl EventHandler for Segmenter<'_> {
    fn open(&mut self, tag: &OpenTag) {
        if !tag::is_void(&tag.name) {
            self.tag_stack.push(tag.name.clone());
        }

        if tag.class_contains(BOILERPLATE_CLASS) {
            self.mode = Mode::Boilerplate { depth: 1 };
            return;
        }

        if let Mode::Boilerplate { depth } = &mut self.mode {
            if tag.element == Element::Container {
                *depth += 1;
            }
            return;
        }

        if tag.element == Element::Span && tag.class_contains(PAGE_NUMBER_CLASS) {
            if let Mode::Normal | Mode::Toc = self.mode {
                self.mode = Mode::PageNumber {
                    within_toc: self.mode == Mode::Toc,
                };
            }
            return;
        }

        match tag.element {
            Element::Heading(level) => {
                self.open_heading(level, tag);
                return;
            }
            Element::Container => {
                let boundary = tag
                    .id()
                    .and_then(|id| classify_id(id, self.toc_anchors).map(|kind| (id.to_string(), kind)));
                if let Some((id, kind)) = boundary {
                    self.begin_boundary(id, kind, None);
                    return;
                }
            }
            Element::Image => {
                if let Some(src) = tag.attr("src") {
                    let alt = tag.attr("alt").unwrap_or_default();
                    self.images.push(RawImage {
                        src: src.to_string(),
                        alt: alt.to_string(),
                    });
                    if self.current.is_some() {
                        self.inline.push_str(&markdown::image_embed(alt, src));
                    }
                }
            }
            _ => {}
        }

        if self.current.is_some() && !self.suppressed() {
            self.open_formatting(tag.element);
        }
    }

    fn close(&mut self, name: &str) {
        // Only an exact match on top pops; every close still runs the rules below.
        if self.tag_stack.last().is_some_and(|top| top == name) {
            self.tag_stack.pop();
        } else {
            log::trace!("unmatched </{name}>, tag stack left as is");
        }
        let element = Element::from_name(name);

        if let Mode::Boilerplate { depth } = &mut self.mode {
            if element == Element::Container {
                *depth -= 1;
                if *depth == 0 {
                    self.mode = Mode::Normal;
                }
                return;
            }
        }

        if let Mode::PageNumber { within_toc } = self.mode {
            if element == Element::Span {
                self.mode = if within_toc { Mode::Toc } else { Mode::Normal };
                return;
            }
        }

        if let Element::Heading(_) = element {
            if let Some(capture) = self.heading.take() {
                self.close_heading(capture);
            }
            return;
        }

        if !self.suppressed() {
            self.close_formatting(element);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = self.heading.as_mut() {
            if !matches!(self.mode, Mode::PageNumber { .. } | Mode::Boilerplate { .. }) {
                capture.text.push_str(text);
            }
            return;
        }

        if !self.suppressed() && self.current.is_some() {
            self.inline.push_str(text);
        }
    }
}

/// Lowercase ASCII slug of at most 50 characters.
fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut slug = RE_NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string();
    // only ASCII remains, so byte truncation is safe
    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}
