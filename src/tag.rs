//! Tag/text event stream over the html5ever tokenizer.
//!
//! No tree is built: converters see a flat sequence of open, close and text
//! events in document order, exactly as the markup was written, malformed or
//! not.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// Tag categories the converters act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// `h1` to `h4`
    Heading(u8),
    /// `div`, `section`
    Container,
    Paragraph,
    BlockQuote,
    ListItem,
    /// `ul`, `ol`
    List,
    /// `em`, `i`
    Emphasis,
    /// `strong`, `b`
    Strong,
    LineBreak,
    Rule,
    Image,
    Span,
    Other,
}

impl Element {
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" => Element::Heading(1),
            "h2" => Element::Heading(2),
            "h3" => Element::Heading(3),
            "h4" => Element::Heading(4),
            "div" | "section" => Element::Container,
            "p" => Element::Paragraph,
            "blockquote" => Element::BlockQuote,
            "li" => Element::ListItem,
            "ul" | "ol" => Element::List,
            "em" | "i" => Element::Emphasis,
            "strong" | "b" => Element::Strong,
            "br" => Element::LineBreak,
            "hr" => Element::Rule,
            "img" => Element::Image,
            "span" => Element::Span,
            _ => Element::Other,
        }
    }
}

/// Elements that never have a closing tag.
pub fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// An opening tag with its attributes.
#[derive(Debug, Clone)]
pub struct OpenTag {
    pub name: String,
    pub element: Element,
    attrs: Vec<(String, String)>,
}

impl OpenTag {
    pub fn new(name: &str, attrs: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            element: Element::from_name(name),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// First value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// True when the `class` attribute contains `needle`, ignoring case.
    pub fn class_contains(&self, needle: &str) -> bool {
        self.attr("class")
            .is_some_and(|class| class.to_lowercase().contains(needle))
    }

    fn from_tag(tag: &Tag) -> Self {
        let name: &str = &tag.name;
        Self {
            name: name.to_string(),
            element: Element::from_name(name),
            attrs: tag
                .attrs
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
        }
    }
}

/// Receiver of the event stream.
pub trait EventHandler {
    fn open(&mut self, tag: &OpenTag);
    fn close(&mut self, name: &str);
    fn text(&mut self, text: &str);
}

struct EventSink<H> {
    handler: H,
}

impl<H: EventHandler> TokenSink for EventSink<H> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => return self.process_tag(tag),
            Token::CharacterTokens(text) => self.handler.text(&text),
            Token::ParseError(err) => log::trace!("tolerating malformed markup: {err}"),
            Token::DoctypeToken(_)
            | Token::CommentToken(_)
            | Token::NullCharacterToken
            | Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

impl<H: EventHandler> EventSink<H> {
    fn process_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        match tag.kind {
            TagKind::StartTag => {
                let open = OpenTag::from_tag(&tag);
                self.handler.open(&open);
                if tag.self_closing {
                    self.handler.close(&open.name);
                    return TokenSinkResult::Continue;
                }
                match open.name.as_str() {
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" => TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                self.handler.close(&tag.name);
                TokenSinkResult::Continue
            }
        }
    }
}

/// Feed `html` through the tokenizer into `handler` and hand it back once
/// the input is exhausted.
pub fn drive<H: EventHandler>(html: &str, handler: H) -> H {
    let mut tokenizer = Tokenizer::new(EventSink { handler }, TokenizerOpts::default());
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.handler
}
