//! rustyfeed - Streaming RSS/Atom to tab-separated records
//!
//! Layers:
//! - core: XML tokenizer, entity decoding, charset handling
//! - feed: RSS/Atom extraction state machine
//! - date, uri: field conversion
//! - record: TSV line codec
//! - strategy: parallel parsing of many feeds
//! - tail: dedup filter over growing TSV files
//!
//! ```
//! use rustyfeed::{parse_bytes, Field, Options};
//!
//! let xml = b"<rss><channel><item><title>Hi</title></item></channel></rss>";
//! let records = parse_bytes(xml, &Options::default()).unwrap();
//! assert_eq!(records[0].get(Field::Title), "Hi");
//! ```

pub mod core;
pub mod date;
pub mod error;
pub mod feed;
pub mod options;
pub mod reader;
pub mod record;
pub mod strategy;
pub mod tail;
pub mod uri;

pub use error::{Error, Result};
pub use feed::{feed_to_tsv, parse_bytes, parse_feed, FeedParser};
pub use options::{Options, TailOptions};
pub use reader::{ByteSource, ReaderSource, SliceSource};
pub use record::{Field, Record, RecordReader, RecordSink, RecordWriter};
pub use strategy::{parse_feeds_parallel, FeedInput};
pub use tail::TailFilter;
