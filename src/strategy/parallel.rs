//! Parallel Feed Parsing
//!
//! Uses Rayon to parse many feeds at once. Each feed gets its own parser,
//! so no state is shared between inputs.

use rayon::prelude::*;

use crate::error::Result;
use crate::feed::parse_bytes;
use crate::options::Options;
use crate::record::Record;

/// One feed to parse
#[derive(Debug, Clone, Default)]
pub struct FeedInput {
    /// Feed name, written to every record
    pub name: String,
    /// Where the feed was fetched from
    pub url: String,
    /// Base for relative item links, usually the site URL
    pub base_url: Option<String>,
    /// Raw document bytes
    pub data: Vec<u8>,
}

impl FeedInput {
    /// Merged-layout options for this feed
    pub fn options(&self) -> Options {
        Options {
            base_url: self.base_url.clone(),
            feed_name: Some(self.name.clone()),
            feed_url: Some(self.url.clone()),
            ..Options::default()
        }
    }
}

/// Parse every feed in parallel, results in input order
pub fn parse_feeds_parallel(feeds: &[FeedInput]) -> Vec<Result<Vec<Record>>> {
    feeds
        .par_iter()
        .map(|feed| parse_bytes(&feed.data, &feed.options()))
        .collect()
}
