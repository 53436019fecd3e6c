//! Tab-Separated Records
//!
//! One feed item per line, fields in a fixed order:
//! - Encoding drops control characters, trims, and escapes `\\`, `\n`, `\t`
//! - Decoding splits on tabs and reverses the escapes
//!
//! The 9-field item layout may be followed by feed-name, feed-url and
//! base-site-url when records of several feeds are merged.

pub mod reader;
pub mod writer;

pub use reader::{parse_line, RecordReader};
pub use writer::RecordWriter;

use memchr::{memchr, memchr3};
use std::borrow::Cow;
use std::io;

/// Field separator
pub const FIELD_SEPARATOR: char = '\t';

/// Fields of a single-feed record
pub const ITEM_FIELDS: usize = 9;

/// Fields of a merged record (item fields plus feed-name, feed-url, base-site-url)
pub const MERGED_FIELDS: usize = 12;

/// Field positions, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UnixTimestamp = 0,
    TimeFormatted,
    Title,
    Link,
    Content,
    ContentType,
    Id,
    Author,
    FeedType,
    FeedName,
    FeedUrl,
    BaseSiteUrl,
}

impl Field {
    /// Position of the field in a line
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One decoded record: plain field values, no escapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// A record with all 9 item fields empty
    pub fn new() -> Self {
        Self::with_arity(ITEM_FIELDS)
    }

    /// A record with `arity` empty fields
    pub fn with_arity(arity: usize) -> Self {
        Self {
            fields: vec![String::new(); arity],
        }
    }

    /// Build a record from field values in order
    pub fn from_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Field value; empty when the record is shorter
    #[inline]
    pub fn get(&self, field: Field) -> &str {
        self.fields.get(field.index()).map_or("", String::as_str)
    }

    /// Set a field, growing the record when needed
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let index = field.index();
        if index >= self.fields.len() {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value.into();
    }

    /// All field values in order
    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The Unix timestamp field as a number
    pub fn timestamp(&self) -> Option<i64> {
        self.get(Field::UnixTimestamp).trim().parse().ok()
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives finished records
pub trait RecordSink {
    fn record(&mut self, record: &Record) -> io::Result<()>;
}

impl RecordSink for Vec<Record> {
    fn record(&mut self, record: &Record) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<K: RecordSink + ?Sized> RecordSink for &mut K {
    fn record(&mut self, record: &Record) -> io::Result<()> {
        (**self).record(record)
    }
}

/// Drop control characters other than tab and newline, then trim whitespace
pub fn clean(value: &str) -> Cow<'_, str> {
    let keep = |c: char| !c.is_control() || c == '\t' || c == '\n';
    if value.chars().all(keep) {
        return Cow::Borrowed(value.trim_matches(|c: char| c.is_ascii_whitespace()));
    }
    let filtered: String = value.chars().filter(|&c| keep(c)).collect();
    Cow::Owned(
        filtered
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .to_string(),
    )
}

/// Encode one field value for a line
///
/// `decode_field(&encode_field(s)) == clean(s)` for any `s`.
pub fn encode_field(value: &str) -> Cow<'_, str> {
    match clean(value) {
        Cow::Borrowed(cleaned) => escape(cleaned),
        Cow::Owned(cleaned) => Cow::Owned(escape(&cleaned).into_owned()),
    }
}

/// Escape backslash, newline and tab
fn escape(value: &str) -> Cow<'_, str> {
    // Fast path: nothing to escape
    if memchr3(b'\\', b'\n', b'\t', value.as_bytes()).is_none() {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`encode_field`]'s escapes
///
/// Unknown escape sequences and a trailing lone backslash are dropped.
pub fn decode_field(value: &str) -> Cow<'_, str> {
    // Fast path: no escapes
    if memchr(b'\\', value.as_bytes()).is_none() {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            _ => {}
        }
    }
    Cow::Owned(out)
}
