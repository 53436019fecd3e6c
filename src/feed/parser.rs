//! Feed extraction state machine
//!
//! Consumes tokenizer events and fills one [`FeedItem`] at a time:
//! - `<item>` (RSS) or `<entry>` (Atom) opens an item
//! - known child tags open a field unless a higher-priority tag already filled it
//! - content fields re-serialize nested markup when the content is HTML
//! - the matching close tag emits the item as a record
//!
//! RSS and Atom items may be mixed in one stream.

use std::io;

use log::{trace, warn};

use super::item::{ContentType, FeedField, FeedItem, FeedType};
use super::tags::TagId;
use crate::core::entities::decode_entity;
use crate::core::tokenizer::{XmlHandler, XmlParser};
use crate::error::Result;
use crate::options::Options;
use crate::reader::ByteSource;
use crate::record::{Field, RecordSink};

/// What the parser is capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// Outside any item
    Idle,
    /// Inside an item, no field open
    Item,
    /// A known tag whose field is already filled at this or a higher priority;
    /// everything up to its close tag is ignored
    Skip(TagId),
    /// Capturing field text
    Field(TagId),
    /// Content tag opened, its attributes still arriving
    ContentTag(TagId),
    /// Inside the body of a content field
    Content(TagId),
}

impl Capture {
    /// Tag of the field receiving text, if any
    #[inline]
    fn open_tag(self) -> Option<TagId> {
        match self {
            Capture::Field(id) | Capture::ContentTag(id) | Capture::Content(id) => Some(id),
            _ => None,
        }
    }
}

/// Feed parser emitting one record per finished item into a [`RecordSink`]
pub struct FeedParser<K: RecordSink> {
    options: Options,
    sink: K,
    item: FeedItem,
    capture: Capture,
    /// Name of the innermost open tag, empty after a close tag
    current_tag: Vec<u8>,
    /// Atom `type` attribute value, collected across chunks
    type_value: Vec<u8>,
    records: usize,
    write_error: Option<io::Error>,
}

impl<K: RecordSink> FeedParser<K> {
    /// Create a parser writing records to `sink`
    pub fn new(options: Options, sink: K) -> Self {
        Self {
            options,
            sink,
            item: FeedItem::new(),
            capture: Capture::Idle,
            current_tag: Vec::with_capacity(32),
            type_value: Vec::new(),
            records: 0,
            write_error: None,
        }
    }

    /// Parse one document to EOF
    ///
    /// Returns the number of records emitted by this call. A read error
    /// ends the parse with `Error::Io`; items finished before it were
    /// already emitted. An item left open at EOF is dropped.
    pub fn parse<S: ByteSource>(&mut self, source: S) -> Result<usize> {
        let before = self.records;
        self.item.clear();
        self.capture = Capture::Idle;

        XmlParser::new(source).parse(self)?;
        if let Some(err) = self.write_error.take() {
            return Err(err.into());
        }
        Ok(self.records - before)
    }

    /// Records emitted so far
    #[inline]
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Give back the record sink
    pub fn into_sink(self) -> K {
        self.sink
    }

    #[inline]
    fn is_html(&self) -> bool {
        self.item.content_type == ContentType::Html
    }

    #[inline]
    fn in_html_content(&self) -> bool {
        matches!(self.capture, Capture::Content(_)) && self.is_html()
    }

    /// Append to the open field, if any
    #[inline]
    fn append(&mut self, bytes: &[u8]) {
        if let Some(field) = self.capture.open_tag().and_then(TagId::field) {
            self.item.append(field, bytes);
        }
    }

    /// Append character data to the open field
    fn append_text(&mut self, bytes: &[u8]) {
        match self.capture.open_tag() {
            // Atom author: only the text of a nested <name>
            Some(TagId::AtomAuthor) if !self.current_tag.eq_ignore_ascii_case(b"name") => {}
            // Atom link: only the href attribute
            Some(TagId::AtomLink) | None => {}
            Some(_) => self.append(bytes),
        }
    }

    /// Start capturing the field for `tag` if it outranks what the item holds
    fn open_field(&mut self, tag: &[u8]) {
        let id = TagId::lookup(self.item.feed_type, tag);
        let Some(field) = id.field() else {
            return;
        };

        // Same tag again, or a lower priority one: first/higher wins
        if id <= self.item.tag(field) {
            self.capture = Capture::Skip(id);
            return;
        }

        self.item.open(field, id);
        if id.is_content() {
            if self.item.feed_type == FeedType::Atom {
                self.item.content_type = ContentType::Plain;
            }
            self.capture = Capture::ContentTag(id);
        } else {
            self.capture = Capture::Field(id);
        }
    }

    /// Whether `tag` closes the item of the current feed type
    fn closes_item(&self, tag: &[u8]) -> bool {
        match self.item.feed_type {
            FeedType::Rss => tag.eq_ignore_ascii_case(b"item"),
            FeedType::Atom => tag.eq_ignore_ascii_case(b"entry"),
            FeedType::None => false,
        }
    }

    /// Convert the finished item and hand it to the sink
    fn emit(&mut self) {
        let mut record = self.item.to_record(self.options.base_url.as_deref());
        if self.options.is_merged() {
            record.set(Field::FeedName, self.options.feed_name.as_deref().unwrap_or(""));
            record.set(Field::FeedUrl, self.options.feed_url.as_deref().unwrap_or(""));
            record.set(Field::BaseSiteUrl, self.options.base_url.as_deref().unwrap_or(""));
        }
        trace!("{} item: {:?}", self.item.feed_type.as_str(), record.get(Field::Title));

        // After a failed write, keep parsing but stop writing
        if self.write_error.is_some() {
            return;
        }
        match self.sink.record(&record) {
            Ok(()) => self.records += 1,
            Err(err) => {
                warn!("writing record failed: {err}");
                self.write_error = Some(err);
            }
        }
    }

    /// Attribute value bytes outside content markup
    fn attr_chunk(&mut self, name: &[u8], value: &[u8]) {
        match self.capture {
            Capture::ContentTag(_)
                if self.item.feed_type == FeedType::Atom && name.eq_ignore_ascii_case(b"type") =>
            {
                self.type_value.extend_from_slice(value);
            }
            Capture::Field(TagId::AtomLink) if name.eq_ignore_ascii_case(b"href") => {
                self.item.append(FeedField::Link, value);
            }
            _ => {}
        }
    }
}

impl<K: RecordSink> XmlHandler for FeedParser<K> {
    fn tag_start(&mut self, tag: &[u8]) {
        self.current_tag.clear();
        self.current_tag.extend_from_slice(tag);

        match self.capture {
            Capture::Content(_) => {
                if self.is_html() {
                    self.append(b"<");
                    self.append(tag);
                }
            }
            Capture::Idle => {
                let feed_type = if tag.eq_ignore_ascii_case(b"entry") {
                    FeedType::Atom
                } else if tag.eq_ignore_ascii_case(b"item") {
                    FeedType::Rss
                } else {
                    return;
                };
                self.item.start(feed_type);
                self.capture = Capture::Item;
            }
            Capture::Item => self.open_field(tag),
            // Nested tags inside a plain field are not fields themselves
            Capture::Skip(_) | Capture::Field(_) | Capture::ContentTag(_) => {}
        }
    }

    fn attr_start(&mut self, _tag: &[u8], name: &[u8]) {
        self.type_value.clear();
        if self.in_html_content() {
            self.append(b" ");
            self.append(name);
            self.append(b"=\"");
        }
    }

    fn attr(&mut self, _tag: &[u8], name: &[u8], value: &[u8]) {
        match self.capture {
            Capture::Content(_) => {
                if self.is_html() {
                    self.append(value);
                }
            }
            _ => self.attr_chunk(name, value),
        }
    }

    fn attr_entity(&mut self, _tag: &[u8], name: &[u8], entity: &[u8]) {
        match self.capture {
            // Still markup: keep the reference as written
            Capture::Content(_) => {
                if self.is_html() {
                    self.append(entity);
                }
            }
            _ => match decode_entity(entity) {
                Some(decoded) => self.attr_chunk(name, decoded.as_bytes()),
                None => self.attr_chunk(name, entity),
            },
        }
    }

    fn attr_end(&mut self, _tag: &[u8], name: &[u8]) {
        match self.capture {
            Capture::Content(_) => {
                if self.is_html() {
                    self.append(b"\"");
                }
            }
            Capture::ContentTag(_)
                if self.item.feed_type == FeedType::Atom && name.eq_ignore_ascii_case(b"type") =>
            {
                if let Some(content_type) = ContentType::from_atom_type(&self.type_value) {
                    self.item.content_type = content_type;
                }
            }
            _ => {}
        }
    }

    fn tag_start_parsed(&mut self, _tag: &[u8], is_short: bool) {
        match self.capture {
            Capture::ContentTag(id) => self.capture = Capture::Content(id),
            Capture::Content(_) if self.is_html() => {
                let close: &[u8] = if is_short { b"/>" } else { b">" };
                self.append(close);
            }
            _ => {}
        }
    }

    fn tag_end(&mut self, tag: &[u8], is_short: bool) {
        self.current_tag.clear();

        match self.capture {
            Capture::Idle => {}
            Capture::Content(id) => {
                if TagId::lookup(self.item.feed_type, tag) == id {
                    self.capture = Capture::Item;
                } else if !is_short && self.is_html() {
                    self.append(b"</");
                    self.append(tag);
                    self.append(b">");
                }
            }
            Capture::Item => {
                if self.closes_item(tag) {
                    self.emit();
                    self.item.clear();
                    self.capture = Capture::Idle;
                }
            }
            Capture::Skip(id) | Capture::Field(id) | Capture::ContentTag(id) => {
                if TagId::lookup(self.item.feed_type, tag) == id {
                    self.capture = Capture::Item;
                }
            }
        }
    }

    fn data(&mut self, data: &[u8]) {
        self.append_text(data);
    }

    fn data_entity(&mut self, entity: &[u8]) {
        match decode_entity(entity) {
            Some(decoded) => self.append_text(decoded.as_bytes()),
            None => self.append_text(entity),
        }
    }

    fn cdata(&mut self, data: &[u8]) {
        self.append_text(data);
    }
}
