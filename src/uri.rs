//! Link Resolution
//!
//! Items often carry relative links. Each link is resolved against the
//! feed's base URL and percent-encoded before it is written out:
//! - a link with a host is absolute (a missing protocol is taken from the base)
//! - `/path` is relative to the base host
//! - anything else is relative to the base directory
//!
//! Components have fixed limits; exceeding one is an error, never a
//! silent truncation.

use std::fmt;
use std::fmt::Write as _;

use crate::core::scanner::Scanner;
use crate::error::{Error, Result};

/// Longest protocol name, e.g. `https`
pub const MAX_PROTO: usize = 48;
/// Longest host name
pub const MAX_HOST: usize = 255;
/// Longest path (including query and fragment)
pub const MAX_PATH: usize = 2048;
/// Longest resolved and encoded URI
pub const MAX_URI: usize = 4096;

/// A URI split into the parts resolution needs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Uri {
    /// Protocol without `://`, empty for protocol-relative or relative URIs
    pub proto: String,
    /// Host, empty for relative URIs
    pub host: String,
    pub port: Option<u16>,
    /// Path with query and fragment; `/` when a host is present and no path was given
    pub path: String,
}

#[inline]
fn is_proto_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')
}

#[inline]
fn ends_host(b: u8) -> bool {
    matches!(b, b'/' | b':' | b'?' | b'#')
}

#[inline]
fn check_len(component: &'static str, value: &[u8], limit: usize) -> Result<()> {
    if value.len() > limit {
        return Err(Error::UriTooLong { component, limit });
    }
    Ok(())
}

#[inline]
fn to_string(bytes: &[u8]) -> String {
    // Split points are ASCII, so slices of a &str stay valid UTF-8
    String::from_utf8_lossy(bytes).into_owned()
}

impl Uri {
    /// Split `s` into protocol, host, port and path
    pub fn parse(s: &str) -> Result<Self> {
        let mut scanner = Scanner::new(s.as_bytes());
        let mut uri = Uri::default();

        let proto = scanner.clone().take_while(is_proto_byte);
        let has_authority = if !proto.is_empty() && s.as_bytes()[proto.len()..].starts_with(b"://") {
            check_len("protocol", proto, MAX_PROTO)?;
            uri.proto = to_string(proto);
            scanner.advance(proto.len() + 3);
            true
        } else {
            // Protocol-relative: "//host/path"
            scanner.eat_slice(b"//")
        };

        if has_authority {
            let host = scanner.take_while(|b| !ends_host(b));
            if host.is_empty() {
                return Err(Error::InvalidUri("empty host"));
            }
            check_len("host", host, MAX_HOST)?;
            uri.host = to_string(host);

            if scanner.eat(b':') {
                let digits = scanner.take_while(|b| !matches!(b, b'/' | b'?' | b'#'));
                uri.port = parse_port(digits)?;
            }
        }

        let path = scanner.take_rest();
        check_len("path", path, MAX_PATH)?;
        uri.path = to_string(path);
        if has_authority && !uri.path.starts_with('/') {
            uri.path.insert(0, '/');
        }
        Ok(uri)
    }

    /// Whether the URI names a host, making it absolute
    #[inline]
    pub fn has_host(&self) -> bool {
        !self.host.is_empty()
    }
}

/// Digits-only port in 1..=65535; an empty port is absent
fn parse_port(digits: &[u8]) -> Result<Option<u16>> {
    if digits.is_empty() {
        return Ok(None);
    }
    if digits.len() > 5 || !digits.iter().all(u8::is_ascii_digit) {
        return Err(Error::InvalidUri("port must be 1 to 5 digits"));
    }
    let port = digits
        .iter()
        .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(Some(port)),
        _ => Err(Error::InvalidUri("port out of range")),
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_host() {
            if !self.proto.is_empty() {
                write!(f, "{}:", self.proto)?;
            }
            write!(f, "//{}", self.host)?;
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
        }
        f.write_str(&self.path)
    }
}

/// Split `s` into protocol, host, port and path
#[inline]
pub fn parse_uri(s: &str) -> Result<Uri> {
    Uri::parse(s)
}

/// Resolve `link` against `base` into an absolute, percent-encoded URI
///
/// Fails when neither side has a host, when a component is malformed, or
/// when a component or the result exceeds its limit.
pub fn resolve(link: &str, base: &str) -> Result<String> {
    let link = Uri::parse(link)?;

    let resolved = if link.has_host() {
        let proto = if link.proto.is_empty() {
            Uri::parse(base)
                .ok()
                .map(|base| base.proto)
                .filter(|proto| !proto.is_empty())
                .unwrap_or_else(|| "http".to_string())
        } else {
            link.proto
        };
        Uri { proto, ..link }
    } else {
        let base = Uri::parse(base)?;
        if !base.has_host() {
            return Err(Error::NoHost);
        }

        let path = if link.path.starts_with('/') {
            link.path
        } else {
            // Base directory: everything up to and including the last '/'
            let dir = match base.path.rfind('/') {
                Some(slash) => &base.path[..=slash],
                None => "/",
            };
            format!("{dir}{}", link.path)
        };
        check_len("path", path.as_bytes(), MAX_PATH)?;

        Uri {
            proto: if base.proto.is_empty() {
                "http".to_string()
            } else {
                base.proto
            },
            host: base.host,
            port: base.port,
            path,
        }
    };

    encode_uri(&resolved.to_string())
}

/// Percent-encode spaces, control bytes and bytes above 127
pub fn encode_uri(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b == b' ' {
            out.push_str("%20");
        } else if b > 127 || b.is_ascii_control() {
            // Writing to a String cannot fail
            let _ = write!(out, "%{b:02X}");
        } else {
            out.push(char::from(b));
        }
    }
    check_len("result", out.as_bytes(), MAX_URI)?;
    Ok(out)
}
