//! Feed Extraction
//!
//! Turns RSS and Atom documents into records:
//! - `tags`: element name tables and field priorities
//! - `item`: the item being filled and its conversion to a record
//! - `parser`: the state machine driven by tokenizer events

pub mod item;
pub mod parser;
pub mod tags;

pub use item::{ContentType, FeedField, FeedItem, FeedType};
pub use parser::FeedParser;
pub use tags::TagId;

use std::io::{Read, Write};

use log::debug;

use crate::core::encoding::transcode_to_utf8;
use crate::error::Result;
use crate::options::Options;
use crate::reader::{ByteSource, ReaderSource, SliceSource};
use crate::record::{Record, RecordSink, RecordWriter};

/// Parse a feed from any byte source into `sink`
///
/// Returns the number of records emitted.
pub fn parse_feed<S, K>(source: S, options: &Options, sink: K) -> Result<usize>
where
    S: ByteSource,
    K: RecordSink,
{
    let mut parser = FeedParser::new(options.clone(), sink);
    let count = parser.parse(source)?;
    debug!("parsed {count} records");
    Ok(count)
}

/// Parse an in-memory feed into records
///
/// With `options.transcode` the declared or detected charset is converted
/// to UTF-8 first.
pub fn parse_bytes(input: &[u8], options: &Options) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    if options.transcode {
        let utf8 = transcode_to_utf8(input);
        parse_feed(SliceSource::new(&utf8), options, &mut records)?;
    } else {
        parse_feed(SliceSource::new(input), options, &mut records)?;
    }
    Ok(records)
}

/// Stream a feed from `reader` to TSV lines on `writer`
///
/// Bytes are parsed as they arrive, without transcoding. Lines of items
/// finished before a read error are still written.
pub fn feed_to_tsv<R: Read, W: Write>(reader: R, writer: W, options: &Options) -> Result<usize> {
    let mut writer = RecordWriter::new(writer);
    let result = parse_feed(ReaderSource::new(reader), options, &mut writer);
    writer.flush()?;
    result
}
