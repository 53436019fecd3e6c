//! Streaming XML Tokenizer with XmlHandler Trait
//!
//! Single pass, byte at a time, no tree:
//! - Tags and attributes are reported as they are recognized
//! - Character data, CDATA and comments arrive in bounded chunks
//! - Entity references are handed over raw for the handler to decode
//!
//! The tokenizer is not a validating parser. Malformed input never panics
//! or loops; it simply produces whatever events the bytes suggest until EOF.

use std::io;

use crate::reader::ByteSource;

/// Tag name buffer size; longer names are truncated.
pub const TAG_BUFFER_SIZE: usize = 1024;

/// Attribute name buffer size; longer names are truncated.
pub const ATTR_NAME_BUFFER_SIZE: usize = 256;

/// Data buffer size; longer runs of text are delivered in several chunks.
pub const DATA_BUFFER_SIZE: usize = 8192;

/// Probe buffer for `<!` declarations, enough for `[CDATA[`.
const PROBE_SIZE: usize = 8;

const COMMENT_END: &[u8; 3] = b"-->";
const CDATA_END: &[u8; 3] = b"]]>";

/// Trait for handling tokenizer events
///
/// Every method defaults to a no-op; implement only the hooks you need.
/// Chunked hooks (`data`, `attr`, `cdata`, `comment`) may fire several times
/// for one logical value: never assume one call holds a whole value.
#[allow(unused_variables)]
pub trait XmlHandler {
    /// `<name` recognized, before any attribute
    fn tag_start(&mut self, tag: &[u8]) {}

    /// An attribute of `tag` begins
    fn attr_start(&mut self, tag: &[u8], name: &[u8]) {}

    /// A chunk of an attribute value (fires with an empty chunk for valueless attributes)
    fn attr(&mut self, tag: &[u8], name: &[u8], value: &[u8]) {}

    /// The attribute value is complete
    fn attr_end(&mut self, tag: &[u8], name: &[u8]) {}

    /// Raw entity reference inside an attribute value, `&` through `;`
    fn attr_entity(&mut self, tag: &[u8], name: &[u8], entity: &[u8]) {}

    /// The opening tag is fully consumed
    fn tag_start_parsed(&mut self, tag: &[u8], is_short: bool) {}

    /// `</name>`, or the end of a self-closing tag (`is_short`)
    fn tag_end(&mut self, tag: &[u8], is_short: bool) {}

    /// Character data between tags begins
    fn data_start(&mut self) {}

    /// A chunk of character data
    fn data(&mut self, data: &[u8]) {}

    /// Raw entity reference in character data, `&` through `;`
    fn data_entity(&mut self, entity: &[u8]) {}

    /// Character data ends at `<`
    fn data_end(&mut self) {}

    fn cdata_start(&mut self) {}

    fn cdata(&mut self, data: &[u8]) {}

    fn cdata_end(&mut self) {}

    fn comment_start(&mut self) {}

    fn comment(&mut self, data: &[u8]) {}

    fn comment_end(&mut self) {}
}

/// Marked section kinds sharing the end-marker scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Comment,
    CData,
}

impl Section {
    #[inline]
    fn end_marker(self) -> &'static [u8; 3] {
        match self {
            Section::Comment => COMMENT_END,
            Section::CData => CDATA_END,
        }
    }

    fn start<H: XmlHandler>(self, handler: &mut H) {
        match self {
            Section::Comment => handler.comment_start(),
            Section::CData => handler.cdata_start(),
        }
    }

    fn chunk<H: XmlHandler>(self, handler: &mut H, data: &[u8]) {
        match self {
            Section::Comment => handler.comment(data),
            Section::CData => handler.cdata(data),
        }
    }

    fn end<H: XmlHandler>(self, handler: &mut H) {
        match self {
            Section::Comment => handler.comment_end(),
            Section::CData => handler.cdata_end(),
        }
    }
}

/// XML whitespace as the tokenizer sees it
#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Streaming tokenizer over a [`ByteSource`]
///
/// Owns its tag, attribute-name and data buffers; they are reused across
/// events so a parse allocates only up front.
pub struct XmlParser<S> {
    source: S,
    tag: Vec<u8>,
    is_short: bool,
    name: Vec<u8>,
    data: Vec<u8>,
}

impl<S: ByteSource> XmlParser<S> {
    /// Create a tokenizer reading from `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            tag: Vec::with_capacity(64),
            is_short: false,
            name: Vec::with_capacity(32),
            data: Vec::with_capacity(DATA_BUFFER_SIZE),
        }
    }

    /// Tokenize the whole input, calling handler methods for each event
    ///
    /// Returns `Err` only when the source stopped on a read error; events
    /// for everything read before the error have already been delivered.
    pub fn parse<H: XmlHandler>(&mut self, handler: &mut H) -> io::Result<()> {
        // `None` from the scanners just means the input ran out
        let _ = self.scan(handler);
        match self.source.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[inline]
    fn next(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    fn scan<H: XmlHandler>(&mut self, handler: &mut H) -> Option<()> {
        // Anything before the first '<' is not part of the document
        while self.next()? != b'<' {}

        loop {
            self.scan_markup(handler)?;
            self.scan_data(handler)?;
        }
    }

    // ========================================================================
    // Markup
    // ========================================================================

    /// Scan markup after '<'
    fn scan_markup<H: XmlHandler>(&mut self, handler: &mut H) -> Option<()> {
        let mut c = self.next()?;
        if c == b'!' {
            return self.scan_declaration(handler);
        }

        while is_space(c) {
            c = self.next()?;
        }

        self.tag.clear();
        self.tag.push(c);
        // Processing instructions have no end tag
        let is_pi = c == b'?';
        self.is_short = is_pi;

        loop {
            let c = self.next()?;
            if c == b'/' {
                self.is_short = true;
            } else if c == b'>' || is_space(c) {
                if self.tag[0] == b'/' {
                    if self.tag.len() > 1 {
                        handler.tag_end(&self.tag[1..], false);
                    }
                } else {
                    handler.tag_start(&self.tag);
                    if is_space(c) {
                        self.scan_attrs(handler)?;
                    }
                    handler.tag_start_parsed(&self.tag, self.is_short);
                    if self.is_short {
                        handler.tag_end(&self.tag, true);
                    }
                }
                return Some(());
            } else if self.tag.len() < TAG_BUFFER_SIZE - 1 {
                self.tag.push(c);
            }
        }
    }

    /// Scan `<!`: comment, CDATA, or a declaration skipped up to '>'
    fn scan_declaration<H: XmlHandler>(&mut self, handler: &mut H) -> Option<()> {
        let mut probe = [0u8; PROBE_SIZE];
        let mut len = 0;

        loop {
            let c = self.next()?;
            if len < PROBE_SIZE - 1 {
                probe[len] = c;
                len += 1;
            }
            if c == b'>' {
                return Some(());
            } else if c == b'-' && len == 2 && probe[0] == b'-' {
                return self.scan_section(handler, Section::Comment);
            } else if c == b'[' && len == 7 && &probe[..7] == b"[CDATA[" {
                return self.scan_section(handler, Section::CData);
            }
        }
    }

    /// Scan a comment or CDATA body up to its end marker
    ///
    /// A partial marker followed by anything else is content.
    fn scan_section<H: XmlHandler>(&mut self, handler: &mut H, section: Section) -> Option<()> {
        let end = section.end_marker();
        let mut matched = 0;

        self.data.clear();
        section.start(handler);

        loop {
            let c = self.next()?;
            if c == end[matched] {
                matched += 1;
                if matched == end.len() {
                    if !self.data.is_empty() {
                        section.chunk(handler, &self.data);
                    }
                    self.data.clear();
                    section.end(handler);
                    return Some(());
                }
                continue;
            }

            if matched > 0 {
                if matched == 2 && c == end[0] {
                    // "--" then '-': one dash is content, the match stays at two
                    self.push_section_byte(handler, section, end[0]);
                    continue;
                }
                for &b in &end[..matched] {
                    self.push_section_byte(handler, section, b);
                }
                matched = 0;
            }
            self.push_section_byte(handler, section, c);
        }
    }

    #[inline]
    fn push_section_byte<H: XmlHandler>(&mut self, handler: &mut H, section: Section, b: u8) {
        if self.data.len() >= DATA_BUFFER_SIZE - 1 {
            section.chunk(handler, &self.data);
            self.data.clear();
        }
        self.data.push(b);
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Scan attributes up to the closing '>'
    fn scan_attrs<H: XmlHandler>(&mut self, handler: &mut H) -> Option<()> {
        self.name.clear();
        let mut name_ended = false;

        loop {
            let c = self.next()?;

            if is_space(c) {
                if !self.name.is_empty() {
                    name_ended = true;
                }
                continue;
            }

            if c == b'?' || c == b'=' {
                // PI marker, or the name is complete
            } else if !self.name.is_empty()
                && ((name_ended && c.is_ascii_alphabetic()) || c == b'>' || c == b'/')
            {
                // Attribute without a value
                handler.attr_start(&self.tag, &self.name);
                handler.attr(&self.tag, &self.name, b"");
                handler.attr_end(&self.tag, &self.name);
                name_ended = false;
                self.name.clear();
                self.name.push(c);
            } else if !self.name.is_empty() && (c == b'\'' || c == b'"') {
                self.scan_attr_value(handler, c)?;
                self.name.clear();
                name_ended = false;
            } else if self.name.len() < ATTR_NAME_BUFFER_SIZE - 1 {
                self.name.push(c);
            }

            if c == b'>' {
                return Some(());
            } else if c == b'/' {
                self.is_short = true;
                self.name.clear();
            }
        }
    }

    /// Scan a quoted attribute value; `quote` is the opening quote byte
    fn scan_attr_value<H: XmlHandler>(&mut self, handler: &mut H, quote: u8) -> Option<()> {
        handler.attr_start(&self.tag, &self.name);
        self.data.clear();

        loop {
            let mut c = self.next()?;

            if c == b'&' {
                if !self.data.is_empty() {
                    handler.attr(&self.tag, &self.name, &self.data);
                }
                self.data.clear();
                self.data.push(c);

                loop {
                    c = self.next()?;
                    if c == quote {
                        break;
                    }
                    if self.data.len() >= DATA_BUFFER_SIZE - 1 {
                        // Too long for a reference: plain value text
                        handler.attr(&self.tag, &self.name, &self.data);
                        self.data.clear();
                        self.data.push(c);
                        break;
                    }
                    self.data.push(c);
                    if c == b';' {
                        handler.attr_entity(&self.tag, &self.name, &self.data);
                        self.data.clear();
                        break;
                    }
                }
            } else if c != quote {
                if self.data.len() >= DATA_BUFFER_SIZE - 1 {
                    handler.attr(&self.tag, &self.name, &self.data);
                    self.data.clear();
                }
                self.data.push(c);
            }

            if c == quote {
                handler.attr(&self.tag, &self.name, &self.data);
                handler.attr_end(&self.tag, &self.name);
                self.data.clear();
                return Some(());
            }
        }
    }

    // ========================================================================
    // Character data
    // ========================================================================

    /// Scan character data up to the next '<'
    fn scan_data<H: XmlHandler>(&mut self, handler: &mut H) -> Option<()> {
        self.data.clear();
        handler.data_start();

        loop {
            let mut c = self.next()?;

            if c == b'&' {
                if !self.data.is_empty() {
                    handler.data(&self.data);
                }
                self.data.clear();
                self.data.push(c);

                loop {
                    c = self.next()?;
                    if c == b'<' {
                        break;
                    }
                    if self.data.len() >= DATA_BUFFER_SIZE - 1 {
                        // Too long for a reference: plain text
                        handler.data(&self.data);
                        self.data.clear();
                        self.data.push(c);
                        break;
                    }
                    self.data.push(c);
                    if is_space(c) {
                        // Not an entity after all: keep it as text
                        break;
                    } else if c == b';' {
                        handler.data_entity(&self.data);
                        self.data.clear();
                        break;
                    }
                }
            } else if c != b'<' {
                if self.data.len() >= DATA_BUFFER_SIZE - 1 {
                    handler.data(&self.data);
                    self.data.clear();
                }
                self.data.push(c);
            }

            if c == b'<' {
                if !self.data.is_empty() {
                    handler.data(&self.data);
                    self.data.clear();
                }
                handler.data_end();
                return Some(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SliceSource;

    /// Records every event as a readable line
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    fn s(b: &[u8]) -> String {
        String::from_utf8_lossy(b).into_owned()
    }

    impl XmlHandler for Recorder {
        fn tag_start(&mut self, tag: &[u8]) {
            self.events.push(format!("start {}", s(tag)));
        }
        fn attr_start(&mut self, _tag: &[u8], name: &[u8]) {
            self.events.push(format!("attr_start {}", s(name)));
        }
        fn attr(&mut self, _tag: &[u8], name: &[u8], value: &[u8]) {
            self.events.push(format!("attr {}={}", s(name), s(value)));
        }
        fn attr_end(&mut self, _tag: &[u8], name: &[u8]) {
            self.events.push(format!("attr_end {}", s(name)));
        }
        fn attr_entity(&mut self, _tag: &[u8], name: &[u8], entity: &[u8]) {
            self.events.push(format!("attr_entity {}={}", s(name), s(entity)));
        }
        fn tag_start_parsed(&mut self, tag: &[u8], is_short: bool) {
            self.events.push(format!("parsed {} {}", s(tag), is_short));
        }
        fn tag_end(&mut self, tag: &[u8], is_short: bool) {
            self.events.push(format!("end {} {}", s(tag), is_short));
        }
        fn data(&mut self, data: &[u8]) {
            self.events.push(format!("data {}", s(data)));
        }
        fn data_entity(&mut self, entity: &[u8]) {
            self.events.push(format!("entity {}", s(entity)));
        }
        fn cdata(&mut self, data: &[u8]) {
            self.events.push(format!("cdata {}", s(data)));
        }
        fn cdata_end(&mut self) {
            self.events.push("cdata_end".to_string());
        }
        fn comment(&mut self, data: &[u8]) {
            self.events.push(format!("comment {}", s(data)));
        }
        fn comment_end(&mut self) {
            self.events.push("comment_end".to_string());
        }
    }

    fn events(input: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        XmlParser::new(SliceSource::from(input))
            .parse(&mut recorder)
            .unwrap();
        recorder.events
    }

    /// Concatenates chunked values, entity references included
    #[derive(Default)]
    struct TextCollector {
        text: Vec<u8>,
        chunks: usize,
        attr: Vec<u8>,
        cdata: Vec<u8>,
        comment: Vec<u8>,
    }

    impl XmlHandler for TextCollector {
        fn data(&mut self, data: &[u8]) {
            self.text.extend_from_slice(data);
            self.chunks += 1;
        }
        fn data_entity(&mut self, entity: &[u8]) {
            self.text.extend_from_slice(entity);
        }
        fn attr(&mut self, _tag: &[u8], _name: &[u8], value: &[u8]) {
            self.attr.extend_from_slice(value);
        }
        fn attr_entity(&mut self, _tag: &[u8], _name: &[u8], entity: &[u8]) {
            self.attr.extend_from_slice(entity);
        }
        fn cdata(&mut self, data: &[u8]) {
            self.cdata.extend_from_slice(data);
        }
        fn comment(&mut self, data: &[u8]) {
            self.comment.extend_from_slice(data);
        }
    }

    fn collect(input: &str) -> TextCollector {
        let mut collector = TextCollector::default();
        XmlParser::new(SliceSource::from(input))
            .parse(&mut collector)
            .unwrap();
        collector
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            events("<a>hi</a>"),
            vec!["start a", "parsed a false", "data hi", "end a false"]
        );
    }

    #[test]
    fn test_attributes() {
        let ev = events(r#"<link href="x" rel='alt'/>"#);
        assert_eq!(
            ev,
            vec![
                "start link",
                "attr_start href",
                "attr href=x",
                "attr_end href",
                "attr_start rel",
                "attr rel=alt",
                "attr_end rel",
                "parsed link true",
                "end link true",
            ]
        );
    }

    #[test]
    fn test_attribute_without_value() {
        let ev = events("<input disabled>");
        assert_eq!(
            ev,
            vec![
                "start input",
                "attr_start disabled",
                "attr disabled=",
                "attr_end disabled",
                "parsed input false",
            ]
        );
    }

    #[test]
    fn test_attribute_entity() {
        let ev = events(r#"<a href="x?a=1&amp;b=2">"#);
        assert!(ev.contains(&"attr href=x?a=1".to_string()));
        assert!(ev.contains(&"attr_entity href=&amp;".to_string()));
        assert!(ev.contains(&"attr href=b=2".to_string()));
    }

    #[test]
    fn test_processing_instruction_is_short() {
        let ev = events(r#"<?xml version="1.0" encoding="UTF-8"?><rss/>"#);
        assert_eq!(ev[0], "start ?xml");
        assert!(ev.contains(&"attr encoding=UTF-8".to_string()));
        assert!(ev.contains(&"parsed ?xml true".to_string()));
        assert!(ev.contains(&"end ?xml true".to_string()));
    }

    #[test]
    fn test_data_entities() {
        let ev = events("<t>Hello &amp; World</t>");
        assert_eq!(
            ev,
            vec![
                "start t",
                "parsed t false",
                "data Hello ",
                "entity &amp;",
                "data  World",
                "end t false",
            ]
        );
    }

    #[test]
    fn test_ampersand_without_semicolon_is_text() {
        let ev = events("<t>a & b</t>");
        assert_eq!(ev[2], "data a ");
        assert_eq!(ev[3], "data & b");
    }

    #[test]
    fn test_cdata() {
        let ev = events("<t><![CDATA[<b>x</b> ]] ]]></t>");
        assert!(ev.contains(&"cdata <b>x</b> ]] ".to_string()));
        assert!(ev.contains(&"cdata_end".to_string()));
    }

    #[test]
    fn test_comment_with_dashes() {
        let ev = events("<t><!-- a - b -- c ---></t>");
        assert!(ev.contains(&"comment  a - b -- c -".to_string()));
        assert!(ev.contains(&"comment_end".to_string()));
        assert_eq!(ev.last().unwrap(), "end t false");
    }

    #[test]
    fn test_doctype_is_skipped() {
        let ev = events("<!DOCTYPE rss><rss></rss>");
        assert_eq!(ev[0], "start rss");
    }

    #[test]
    fn test_tag_name_truncated() {
        let long = "a".repeat(TAG_BUFFER_SIZE * 2);
        let ev = events(&format!("<{long}/>"));
        assert_eq!(ev[0].len(), "start ".len() + TAG_BUFFER_SIZE - 1);
    }

    #[test]
    fn test_data_longer_than_buffer_is_chunked() {
        for size in [DATA_BUFFER_SIZE + 1, 3 * DATA_BUFFER_SIZE + 7] {
            let body = "x".repeat(size);
            let mut collector = TextCollector::default();
            XmlParser::new(SliceSource::from(format!("<a>{body}</a>").as_str()))
                .parse(&mut collector)
                .unwrap();
            assert_eq!(collector.text.len(), size);
            assert!(collector.chunks > 1);
        }
    }

    #[test]
    fn test_unterminated_reference_longer_than_buffer() {
        let run = format!("&{}", "x".repeat(DATA_BUFFER_SIZE + 100));
        let collector = collect(&format!("<a>{run};tail</a>"));
        assert_eq!(collector.text, format!("{run};tail").into_bytes());

        let value = format!("/?a=1&b={}", "y".repeat(DATA_BUFFER_SIZE));
        let collector = collect(&format!("<a href=\"{value}&amp;\"/>"));
        assert_eq!(collector.attr, format!("{value}&amp;").into_bytes());
    }

    #[test]
    fn test_sections_longer_than_buffer() {
        // Partial end markers land right at the first chunk boundary
        let head = "x".repeat(DATA_BUFFER_SIZE - 2);
        let tail = "z".repeat(DATA_BUFFER_SIZE);

        let body = format!("{head}]]{}]{tail}", "y".repeat(10));
        let collector = collect(&format!("<a><![CDATA[{body}]]></a>"));
        assert_eq!(collector.cdata, body.into_bytes());

        let body = format!("{head}---y-{tail}");
        let collector = collect(&format!("<a><!--{body}--></a>"));
        assert_eq!(collector.comment, body.into_bytes());
    }

    #[test]
    fn test_truncated_input_stops_quietly() {
        let ev = events("<rss><item><title>unterminated");
        assert_eq!(ev.last().unwrap(), "parsed title false");
    }
}
