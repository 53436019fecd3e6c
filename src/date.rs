//! Feed Date Parsing
//!
//! Turns the text of `<pubDate>`, `<dc:date>`, `<updated>` and `<published>`
//! into a Unix timestamp:
//! - RFC-822: `Mon, 02 Jan 2023 03:04:05 GMT` (weekday optional)
//! - ISO-8601-ish: `2023-01-02T03:04:05.123Z`, `2023-01-02 03:04:05 +01:00`
//!
//! Calendar math goes through chrono's proleptic Gregorian calendar, so the
//! result never depends on the host time zone database.

use chrono::NaiveDate;

use crate::core::scanner::{is_space, Scanner};
use crate::error::{Error, Result};

static MONTHS: [&[u8]; 12] = [
    b"January",
    b"February",
    b"March",
    b"April",
    b"May",
    b"June",
    b"July",
    b"August",
    b"September",
    b"October",
    b"November",
    b"December",
];

/// RFC-822 zone names and their offsets from UTC in hours
static ZONES: &[(&str, i64)] = &[
    ("UT", 0),
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
    ("A", -1),
    ("B", -2),
    ("C", -3),
    ("D", -4),
    ("E", -5),
    ("F", -6),
    ("G", -7),
    ("H", -8),
    ("I", -9),
    ("K", -10),
    ("L", -11),
    ("M", -12),
    ("N", 1),
    ("O", 2),
    ("P", 3),
    ("Q", 4),
    ("R", 5),
    ("S", 6),
    ("T", 7),
    ("U", 8),
    ("V", 9),
    ("W", 10),
    ("X", 11),
    ("Y", 12),
];

/// A parsed feed timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
    /// Zone offset in seconds east of UTC.
    pub offset: i64,
    /// Wall clock with its zone, e.g. `2023-01-02 03:04:05 GMT+00:00`.
    pub formatted: String,
}

/// A trailing zone designator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Display name: the upper-cased abbreviation, or `GMT` for offsets
    pub name: String,
    /// Offset in seconds east of UTC
    pub offset: i64,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            name: "GMT".to_string(),
            offset: 0,
        }
    }
}

/// Broken-down wall clock as read from the text
#[derive(Debug, Default, Clone, Copy)]
struct Clock {
    // year, month, day, hour, minute, second
    values: [u32; 6],
}

/// Parse a feed date
pub fn parse_date(text: &str) -> Result<ParsedDate> {
    let mut s = Scanner::new(text.as_bytes());
    let mut clock = Clock::default();

    s.skip_whitespace();
    match s.peek() {
        Some(b) if b.is_ascii_digit() && starts_with_day_month(&s) => {
            read_day_month_year(&mut s, &mut clock)?;
            read_clock(&mut s, &mut clock, 3);
        }
        Some(b) if b.is_ascii_digit() => read_clock(&mut s, &mut clock, 0),
        Some(b) if b.is_ascii_alphabetic() => {
            // Weekday name, ignored
            s.take_while(|b| b.is_ascii_alphabetic());
            s.skip_whitespace();
            if !s.eat(b',') {
                return Err(Error::InvalidDate("missing comma after weekday"));
            }
            s.skip_whitespace();
            read_day_month_year(&mut s, &mut clock)?;
            read_clock(&mut s, &mut clock, 3);
        }
        _ => return Err(Error::InvalidDate("expected a digit or a weekday")),
    }

    let zone = parse_zone(s.remaining());
    to_unix(&clock, &zone)
}

/// `02 Jan ...`: RFC-822 without the weekday
fn starts_with_day_month(s: &Scanner<'_>) -> bool {
    let mut probe = s.clone();
    if probe.read_number(2).is_none() || !probe.peek().is_some_and(|b| b == b' ' || b == b'\t') {
        return false;
    }
    probe.skip_whitespace();
    probe.peek().is_some_and(|b| b.is_ascii_alphabetic())
}

/// `%d %b %Y ` with an English month name or abbreviation
fn read_day_month_year(s: &mut Scanner<'_>, clock: &mut Clock) -> Result<()> {
    clock.values[2] = s.read_number(4).unwrap_or(0);
    s.skip_whitespace();

    let word = s.take_while(|b| b.is_ascii_alphabetic());
    if !(3..=9).contains(&word.len()) {
        return Err(Error::InvalidDate("month name cannot match"));
    }
    let month = MONTHS
        .iter()
        .position(|name| {
            (word.len() == 3 || word.len() == name.len())
                && name[..word.len()].eq_ignore_ascii_case(word)
        })
        .ok_or(Error::InvalidDate("unknown month name"))?;
    clock.values[1] = month as u32 + 1;

    s.skip_whitespace();
    clock.values[0] = s.read_number(4).unwrap_or(0);
    s.skip_whitespace();
    Ok(())
}

/// Numeric fields from index `first` on, `%Y-%m-%d[T ]%H:%M:%S[.frac]`
///
/// Missing trailing fields stay zero.
fn read_clock(s: &mut Scanner<'_>, clock: &mut Clock, first: usize) {
    for index in first..clock.values.len() {
        if s.is_eof() {
            break;
        }
        clock.values[index] = s.read_number(4).unwrap_or(0);
        let separator = match s.peek() {
            Some(b'-') => index < 2,
            Some(b) if index == 2 => b == b'T' || is_space(b),
            Some(b':') => index > 2,
            _ => false,
        };
        if separator {
            s.advance(1);
        }
    }

    // Fractional seconds are ignored
    if s.eat(b'.') {
        s.take_while(|b| b.is_ascii_digit());
    }
}

/// Parse a trailing zone: `+HHMM`, `-HH:MM`, `Z` or an RFC-822 name
///
/// Unknown names are UTC.
pub fn parse_zone(text: &[u8]) -> Zone {
    let mut s = Scanner::new(text);
    s.skip_whitespace();

    match s.peek() {
        Some(sign @ (b'+' | b'-')) => {
            s.advance(1);
            let hours = i64::from(s.read_number(2).unwrap_or(0));
            if s.peek().is_some_and(|b| !b.is_ascii_digit()) {
                s.advance(1);
            }
            let minutes = i64::from(s.read_number(2).unwrap_or(0));
            let offset = hours * 3600 + minutes * 60;
            Zone {
                name: "GMT".to_string(),
                offset: if sign == b'-' { -offset } else { offset },
            }
        }
        _ => {
            let word = s.take_while(|b| b.is_ascii_alphabetic());
            ZONES
                .iter()
                .find(|(name, _)| name.as_bytes().eq_ignore_ascii_case(word))
                .map(|&(name, hours)| Zone {
                    name: match name {
                        "Z" | "UT" => "UTC".to_string(),
                        _ => name.to_string(),
                    },
                    offset: hours * 3600,
                })
                .unwrap_or_default()
        }
    }
}

/// Range-check the clock and convert it to a Unix timestamp
fn to_unix(clock: &Clock, zone: &Zone) -> Result<ParsedDate> {
    let [year, month, day, hour, minute, second] = clock.values;

    if year > 9999 {
        return Err(Error::InvalidDate("year out of range"));
    }
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidDate("month out of range"));
    }
    if hour > 23 || minute > 59 || second > 60 {
        return Err(Error::InvalidDate("time of day out of range"));
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or(Error::InvalidDate("day out of range for month"))?;
    // A leap second is one second past :59
    let wall = date
        .and_hms_opt(hour, minute, second.min(59))
        .ok_or(Error::InvalidDate("time of day out of range"))?;
    let timestamp = wall.and_utc().timestamp() + i64::from(second == 60) - zone.offset;

    let sign = if zone.offset < 0 { '-' } else { '+' };
    let abs = zone.offset.abs();
    let formatted = format!(
        "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} {}{sign}{:02}:{:02}",
        zone.name,
        abs / 3600,
        abs % 3600 / 60
    );

    Ok(ParsedDate {
        timestamp,
        offset: zone.offset,
        formatted,
    })
}
