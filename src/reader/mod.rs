//! Byte Sources
//!
//! The tokenizer pulls one byte at a time from a [`ByteSource`]:
//! - SliceSource: borrowed in-memory bytes or a string
//! - ReaderSource: any `Read` implementation, refilled through a fixed buffer

pub mod buffered;
pub mod slice;

pub use buffered::ReaderSource;
pub use slice::SliceSource;

use std::io;

/// Supplies the next input byte.
///
/// `None` means no more bytes. A source backed by I/O keeps the first read
/// error and hands it out through [`ByteSource::take_error`], so a caller can
/// tell a clean end of input from a failed read.
pub trait ByteSource {
    /// Next byte, or `None` at end of input (or after a read error).
    fn next_byte(&mut self) -> Option<u8>;

    /// Take the read error that ended the input, if any.
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        (**self).take_error()
    }
}
