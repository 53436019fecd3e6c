//! Buffered Reader Source
//!
//! Reads from any source implementing the Read trait,
//! refilling an internal buffer when it runs dry.

use std::io::{self, Read};

use super::ByteSource;

/// Buffer size for reading chunks
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Byte source over a reader (file, socket, stdin)
pub struct ReaderSource<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
    error: Option<io::Error>,
}

impl<R: Read> ReaderSource<R> {
    /// Create a new reader source
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new reader source with specified buffer capacity
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        ReaderSource {
            reader,
            buffer: vec![0u8; capacity.max(1)],
            pos: 0,
            end: 0,
            eof: false,
            error: None,
        }
    }

    /// Refill the buffer from the reader.
    ///
    /// Returns false at end of input. Interrupted reads are retried; any
    /// other error is kept and the source reports end of input from then on.
    fn fill_buffer(&mut self) -> bool {
        if self.eof {
            return false;
        }

        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    return false;
                }
                Ok(read) => {
                    self.pos = 0;
                    self.end = read;
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("read error, ending input early: {e}");
                    self.error = Some(e);
                    self.eof = true;
                    return false;
                }
            }
        }
    }

    /// Check if we've reached end of input
    pub fn is_eof(&self) -> bool {
        self.eof && self.pos >= self.end
    }

    /// Give back the wrapped reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        if self.pos >= self.end && !self.fill_buffer() {
            return None;
        }
        let b = self.buffer[self.pos];
        self.pos += 1;
        Some(b)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}
