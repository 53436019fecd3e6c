//! Parse and filter configuration.

use std::num::NonZeroUsize;

/// Default age window of the tail filter: one day.
pub const DEFAULT_MAX_AGE: i64 = 86_400;

/// Default number of (id, title, link) keys remembered per input.
pub const DEFAULT_HISTORY: usize = 4096;

/// Options for a single feed parse.
#[derive(Debug, Clone)]
pub struct Options {
    /// Base URL used to resolve relative item links.
    pub base_url: Option<String>,

    /// Detect the document charset and transcode to UTF-8 before parsing.
    /// Only applies to in-memory input; readers are parsed as-is.
    pub transcode: bool,

    /// Feed name. When set, records use the 12-field merged layout.
    pub feed_name: Option<String>,

    /// Feed URL, written to the merged layout.
    pub feed_url: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: None,
            transcode: true,
            feed_name: None,
            feed_url: None,
        }
    }
}

impl Options {
    /// Options with a base URL and defaults otherwise.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Whether records carry feed-name, feed-url and base-site-url.
    #[inline]
    pub fn is_merged(&self) -> bool {
        self.feed_name.is_some()
    }
}

/// Options for [`crate::tail::TailFilter`].
#[derive(Debug, Clone)]
pub struct TailOptions {
    /// Records older than `now - max_age` seconds are skipped.
    pub max_age: i64,

    /// Capacity of the dedup history.
    pub history: NonZeroUsize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            history: NonZeroUsize::new(DEFAULT_HISTORY).unwrap_or(NonZeroUsize::MIN),
        }
    }
}
