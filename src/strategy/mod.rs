//! Parsing Strategy Module
//!
//! - Streaming: one feed from a byte source (`crate::feed::parse_feed`)
//! - Parallel: many in-memory feeds across the Rayon pool

pub mod parallel;

pub use parallel::{parse_feeds_parallel, FeedInput};
