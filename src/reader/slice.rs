//! In-memory Byte Source
//!
//! Serves bytes from a borrowed slice or string. Never fails.

use super::ByteSource;

/// Byte source over borrowed bytes
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a new source over the input bytes
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        SliceSource { input, pos: 0 }
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }
}

impl<'a> From<&'a [u8]> for SliceSource<'a> {
    fn from(input: &'a [u8]) -> Self {
        Self::new(input)
    }
}

impl<'a> From<&'a str> for SliceSource<'a> {
    fn from(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }
}
