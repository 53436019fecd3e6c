//! XML Entity Decoding
//!
//! Handles decoding of single entity references as the tokenizer reports them:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos; (and upper-case spellings)
//! - Numeric character references: &#123; &#x7B;
//!
//! Anything else is "not an entity" and the caller keeps the raw text.

/// Named entities and their single-byte replacements
static NAMED_ENTITIES: &[(&[u8], u8)] = &[
    (b"lt", b'<'),
    (b"gt", b'>'),
    (b"amp", b'&'),
    (b"apos", b'\''),
    (b"quot", b'"'),
    (b"LT", b'<'),
    (b"GT", b'>'),
    (b"AMP", b'&'),
    (b"APOS", b'\''),
    (b"QUOT", b'"'),
];

/// UTF-8 bytes of one decoded entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    buf: [u8; 4],
    len: u8,
}

impl Decoded {
    #[inline]
    fn byte(b: u8) -> Self {
        Self {
            buf: [b, 0, 0, 0],
            len: 1,
        }
    }

    #[inline]
    fn char(c: char) -> Self {
        let mut buf = [0u8; 4];
        let len = c.encode_utf8(&mut buf).len() as u8;
        Self { buf, len }
    }

    /// The decoded bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl AsRef<[u8]> for Decoded {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Decode one raw entity reference, `&` through `;`
///
/// Returns `None` for input not of the form `&...;`, unknown names, malformed
/// or overflowing numerals, codepoint 0, surrogates and anything past U+10FFFF.
pub fn decode_entity(raw: &[u8]) -> Option<Decoded> {
    let body = raw.strip_prefix(b"&")?.strip_suffix(b";")?;

    match body.strip_prefix(b"#") {
        Some(numeric) => decode_numeric(numeric),
        None => NAMED_ENTITIES
            .iter()
            .find(|(name, _)| *name == body)
            .map(|&(_, b)| Decoded::byte(b)),
    }
}

/// Decode a numeric character reference body (after `#`)
fn decode_numeric(body: &[u8]) -> Option<Decoded> {
    let (digits, radix) = match body.first()? {
        b'x' | b'X' => (&body[1..], 16),
        _ => (body, 10),
    };

    // from_str_radix tolerates a sign; a reference must not carry one
    if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let text = std::str::from_utf8(digits).ok()?;
    let codepoint = u32::from_str_radix(text, radix).ok()?;
    if codepoint == 0 {
        return None;
    }
    char::from_u32(codepoint).map(Decoded::char)
}
