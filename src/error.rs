//! Error types for rustyfeed.
//!
//! Only `Io` ends a parse. The date and URI variants are returned by the
//! field helpers and degraded to empty or literal fields by the emitter.

/// Error type for feed parsing and field conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the feed or writing records failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A timestamp could not be parsed or is out of range.
    #[error("invalid date: {0}")]
    InvalidDate(&'static str),

    /// A URI component is malformed (bad port, empty host).
    #[error("invalid URI: {0}")]
    InvalidUri(&'static str),

    /// A URI component exceeds its fixed limit.
    #[error("URI {component} exceeds {limit} bytes")]
    UriTooLong {
        component: &'static str,
        limit: usize,
    },

    /// Neither the link nor the base URL carries a host.
    #[error("cannot make an absolute URI without a host")]
    NoHost,
}

/// Result type alias for rustyfeed operations.
pub type Result<T> = std::result::Result<T, Error>;
