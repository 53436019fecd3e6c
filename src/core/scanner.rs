//! Byte cursor for short field values
//!
//! Dates and URIs are scanned with the same small cursor:
//! - peek/advance over a borrowed slice, never copying
//! - bounded digit reads for calendar fields

/// Cursor over a borrowed field value
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

/// Whitespace as C `isspace` sees it in the "C" locale
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advance by n bytes (clamped to the end)
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consume `b` if it is the current byte
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `prefix` if the remaining input starts with it
    #[inline]
    pub fn eat_slice(&mut self, prefix: &[u8]) -> bool {
        if self.remaining().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Skip whitespace characters
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    /// Consume bytes while `pred` holds and return them
    #[inline]
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Read up to `max` decimal digits; `None` if there are none
    pub fn read_number(&mut self, max: usize) -> Option<u32> {
        let start = self.pos;
        let mut value = 0u32;
        while self.pos - start < max {
            match self.peek() {
                Some(b @ b'0'..=b'9') => {
                    value = value * 10 + u32::from(b - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        (self.pos > start).then_some(value)
    }

    /// Consume the rest of the input
    #[inline]
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        self.pos = self.input.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_advance() {
        let mut scanner = Scanner::new(b"ab");
        assert_eq!(scanner.peek(), Some(b'a'));
        scanner.advance(1);
        assert_eq!(scanner.peek(), Some(b'b'));
        scanner.advance(5);
        assert!(scanner.is_eof());
        assert_eq!(scanner.peek(), None);
    }

    #[test]
    fn test_read_number() {
        let mut scanner = Scanner::new(b"2023-01");
        assert_eq!(scanner.read_number(4), Some(2023));
        assert!(scanner.eat(b'-'));
        assert_eq!(scanner.read_number(1), Some(0));
        assert_eq!(scanner.read_number(4), Some(1));
        assert_eq!(scanner.read_number(4), None);
    }

    #[test]
    fn test_take_while_and_whitespace() {
        let mut scanner = Scanner::new(b"Mon, \t 02");
        assert_eq!(scanner.take_while(|b| b.is_ascii_alphabetic()), b"Mon");
        assert!(scanner.eat(b','));
        scanner.skip_whitespace();
        assert_eq!(scanner.remaining(), b"02");
    }

    #[test]
    fn test_eat_slice_and_rest() {
        let mut scanner = Scanner::new(b"http://host:80/path");
        assert!(!scanner.eat_slice(b"https://"));
        assert!(scanner.eat_slice(b"http://"));
        assert_eq!(scanner.remaining(), b"host:80/path");
        assert_eq!(scanner.take_while(|b| b != b':'), b"host");
        assert_eq!(scanner.take_rest(), b":80/path");
        assert!(scanner.is_eof());
    }
}
