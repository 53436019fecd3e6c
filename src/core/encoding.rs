//! Feed Encoding Detection and Conversion
//!
//! Detects the character encoding of a feed document:
//! - Byte order mark, or the UTF-16 `<` byte pattern
//! - The `encoding` pseudo-attribute of the leading `<?xml ...?>` declaration
//!
//! Converts non-UTF-8 documents to UTF-8 before parsing.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use super::tokenizer::{XmlHandler, XmlParser};
use crate::reader::SliceSource;

/// The declaration must appear at the very start; no need to look further.
const SNIFF_LIMIT: usize = 1024;

/// Give up on the declaration after this many tags.
const MAX_TAGS: usize = 3;

/// Collects the `encoding` attribute of a leading `<?xml` declaration
#[derive(Default)]
struct DeclarationSniffer {
    tags: usize,
    in_declaration: bool,
    in_encoding: bool,
    value: Vec<u8>,
    found: Option<String>,
}

impl DeclarationSniffer {
    #[inline]
    fn done(&self) -> bool {
        self.found.is_some() || self.tags > MAX_TAGS
    }
}

impl XmlHandler for DeclarationSniffer {
    fn tag_start(&mut self, tag: &[u8]) {
        if self.done() {
            return;
        }
        self.in_declaration = tag.eq_ignore_ascii_case(b"?xml");
        self.tags += 1;
    }

    fn tag_end(&mut self, _tag: &[u8], _is_short: bool) {
        self.in_declaration = false;
    }

    fn attr_start(&mut self, _tag: &[u8], name: &[u8]) {
        self.in_encoding =
            !self.done() && self.in_declaration && name.eq_ignore_ascii_case(b"encoding");
        self.value.clear();
    }

    fn attr(&mut self, _tag: &[u8], _name: &[u8], value: &[u8]) {
        if self.in_encoding {
            self.value.extend_from_slice(value);
        }
    }

    fn attr_end(&mut self, _tag: &[u8], _name: &[u8]) {
        if self.in_encoding && !self.value.is_empty() {
            let label = String::from_utf8_lossy(&self.value).to_ascii_lowercase();
            self.found = Some(label);
        }
        self.in_encoding = false;
    }
}

/// Read the encoding declared by a leading `<?xml ... encoding="..."?>`
///
/// The label is returned lower-cased and unvalidated.
pub fn declared_encoding(input: &[u8]) -> Option<String> {
    let head = &input[..input.len().min(SNIFF_LIMIT)];
    let mut sniffer = DeclarationSniffer::default();
    // An in-memory source cannot fail
    let _ = XmlParser::new(SliceSource::new(head)).parse(&mut sniffer);
    sniffer.found
}

/// Detect the encoding of a feed document
///
/// Order: byte order mark, UTF-16 byte pattern, XML declaration, UTF-8.
/// Unknown declared labels fall back to UTF-8.
#[must_use]
pub fn detect_encoding(input: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(input) {
        return encoding;
    }

    match input {
        [0x00, b'<', ..] => return UTF_16BE,
        [b'<', 0x00, ..] => return UTF_16LE,
        _ => {}
    }

    declared_encoding(input)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        // A UTF-16 label on a byte stream that has no UTF-16 shape is wrong
        .filter(|encoding| *encoding != UTF_16BE && *encoding != UTF_16LE)
        .unwrap_or(UTF_8)
}

/// Transcode a feed document to UTF-8
///
/// Returns Borrowed for UTF-8 input without a byte order mark. Malformed
/// sequences become U+FFFD rather than failing the parse.
#[must_use]
pub fn transcode_to_utf8(input: &[u8]) -> Cow<'_, [u8]> {
    let encoding = detect_encoding(input);

    if encoding == UTF_8 {
        return match input.strip_prefix(b"\xEF\xBB\xBF") {
            Some(rest) => Cow::Borrowed(rest),
            None => Cow::Borrowed(input),
        };
    }

    let (decoded, used, had_errors) = encoding.decode(input);
    if had_errors {
        log::debug!("malformed {} input replaced with U+FFFD", used.name());
    }
    Cow::Owned(decoded.into_owned().into_bytes())
}
