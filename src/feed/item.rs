//! The live feed item
//!
//! One item is filled while the parser is inside `<item>` or `<entry>`.
//! Its buffers are cleared, not freed, between items.

use log::debug;

use super::tags::TagId;
use crate::date;
use crate::error::Error;
use crate::record::{clean, Field, Record};
use crate::uri;

/// Which vocabulary the current item uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    #[default]
    None,
    Rss,
    Atom,
}

impl FeedType {
    /// Name written to the feed-type field
    pub fn as_str(self) -> &'static str {
        match self {
            FeedType::None => "",
            FeedType::Rss => "rss",
            FeedType::Atom => "atom",
        }
    }
}

/// How the content field should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    None,
    Plain,
    Html,
}

impl ContentType {
    /// Name written to the content-type field
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::None => "",
            ContentType::Plain => "plain",
            ContentType::Html => "html",
        }
    }

    /// Atom `type` attribute values that mean markup
    pub fn from_atom_type(value: &[u8]) -> Option<Self> {
        const HTML_TYPES: [&[u8]; 4] = [b"xhtml", b"text/xhtml", b"html", b"text/html"];
        HTML_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(value))
            .then_some(ContentType::Html)
    }
}

/// Logical item fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedField {
    Time,
    Title,
    Link,
    Content,
    Id,
    Author,
}

impl FeedField {
    pub const COUNT: usize = 6;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Text of one field and the tag that filled it
#[derive(Debug, Clone, Default)]
struct FieldBuf {
    tag: TagId,
    text: Vec<u8>,
}

/// The item being parsed
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    fields: [FieldBuf; FeedField::COUNT],
    pub feed_type: FeedType,
    pub content_type: ContentType,
}

impl FeedItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an item of the given type with its default content type
    pub fn start(&mut self, feed_type: FeedType) {
        self.feed_type = feed_type;
        self.content_type = match feed_type {
            FeedType::Rss => ContentType::Html,
            FeedType::Atom => ContentType::Plain,
            FeedType::None => ContentType::None,
        };
    }

    /// Tag that last filled `field`, `Unknown` if none
    #[inline]
    pub fn tag(&self, field: FeedField) -> TagId {
        self.fields[field.index()].tag
    }

    /// Raw bytes captured for `field`
    #[inline]
    pub fn text(&self, field: FeedField) -> &[u8] {
        &self.fields[field.index()].text
    }

    /// Claim `field` for `tag` and clear its text
    pub fn open(&mut self, field: FeedField, tag: TagId) {
        let buf = &mut self.fields[field.index()];
        buf.tag = tag;
        buf.text.clear();
    }

    #[inline]
    pub fn append(&mut self, field: FeedField, bytes: &[u8]) {
        self.fields[field.index()].text.extend_from_slice(bytes);
    }

    /// Reset every field, keeping the buffers
    pub fn clear(&mut self) {
        for buf in &mut self.fields {
            buf.tag = TagId::Unknown;
            buf.text.clear();
        }
        self.feed_type = FeedType::None;
        self.content_type = ContentType::None;
    }

    fn cleaned(&self, field: FeedField) -> String {
        clean(&String::from_utf8_lossy(self.text(field))).into_owned()
    }

    /// Build the output record
    ///
    /// The date is parsed and the link resolved against `base_url` here.
    /// A field that fails to convert is left empty.
    pub fn to_record(&self, base_url: Option<&str>) -> Record {
        let mut record = Record::new();

        let time = self.cleaned(FeedField::Time);
        if !time.is_empty() {
            match date::parse_date(&time) {
                Ok(parsed) => {
                    record.set(Field::UnixTimestamp, parsed.timestamp.to_string());
                    record.set(Field::TimeFormatted, parsed.formatted);
                }
                Err(e) => debug!("ignoring date {time:?}: {e}"),
            }
        }

        record.set(Field::Title, self.cleaned(FeedField::Title));
        record.set(Field::Link, resolve_link(&self.cleaned(FeedField::Link), base_url));

        let content = self.cleaned(FeedField::Content);
        if !content.is_empty() {
            record.set(Field::ContentType, self.content_type.as_str());
        }
        record.set(Field::Content, content);

        record.set(Field::Id, self.cleaned(FeedField::Id));
        record.set(Field::Author, self.cleaned(FeedField::Author));
        record.set(Field::FeedType, self.feed_type.as_str());
        record
    }
}

/// Absolute link, the encoded link itself when there is no host to resolve
/// against, or empty when it cannot be made usable
fn resolve_link(link: &str, base_url: Option<&str>) -> String {
    if link.is_empty() {
        return String::new();
    }
    match uri::resolve(link, base_url.unwrap_or("")) {
        Ok(resolved) => resolved,
        Err(Error::NoHost) => uri::encode_uri(link).unwrap_or_default(),
        Err(e) => {
            debug!("dropping link {link:?}: {e}");
            String::new()
        }
    }
}
