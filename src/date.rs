//! Permissive date/time parsing for syndication feeds.
//!
//! Feeds in the wild carry dates in two incompatible families: RFC-3339-like
//! (`2011-04-17T22:19:05+02:00`, Atom/RDF) and RFC-822-like
//! (`Sun, 17 Jul 2011 21:56:57 +0200`, RSS). [`parse`] accepts both,
//! normalizing to a [`DateTime<FixedOffset>`] that keeps the offset embedded
//! in the source text.
//!
//! This is deliberately not a full RFC 3339 implementation: fractional
//! seconds are skipped rather than interpreted, and the only named zone
//! abbreviation handled is `MEST` (rewritten to `+02:00`). Everything else
//! fails with [`DateParseError`], which callers treat as "date unknown".

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use thiserror::Error;

/// Errors that can occur while parsing a feed date string.
#[derive(Debug, Error)]
pub enum DateParseError {
    /// Input has no single `T`-or-space separator between date and time.
    #[error("no date/time separator in {0:?}")]
    MissingSeparator(String),

    /// Input split into date and time parts but one of them is malformed.
    #[error("malformed date/time component in {0:?}")]
    BadComponent(String),

    /// Timezone suffix is neither `Z` nor a `±HH:MM`/`±HHMM` offset.
    #[error("unrecognized UTC offset in {0:?}")]
    BadOffset(String),

    /// Input matches neither supported date family.
    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),
}

/// Parses a feed date string into an absolute instant.
///
/// Tries the RFC-3339-like family first, then the RFC-822-like family.
/// The offset used is always the one embedded in the text; `_fallback` is
/// accepted for interface compatibility but is inert. Callers that need a
/// different behavior should convert the returned value themselves.
///
/// # Errors
///
/// Returns [`DateParseError`] when the input matches neither family.
/// Callers in the feed handler treat this as a recoverable condition and
/// leave the item date unset.
pub fn parse(text: &str, _fallback: FixedOffset) -> Result<DateTime<FixedOffset>, DateParseError> {
    let text = text.trim();
    parse_rfc3339_like(text).or_else(|_| parse_rfc822_like(text))
}

/// RFC-3339-like family: `YYYY-MM-DD<T or space>HH:MM:SS[.f](Z|±HH:MM)`.
///
/// Matching is case-insensitive (input is upper-cased first). A `.` at the
/// ninth position of the time part skips exactly two bytes (the dot and one
/// fractional digit), unvalidated.
fn parse_rfc3339_like(text: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let upper = text.to_uppercase();

    let parts: Vec<&str> = upper.split('T').collect();
    let (full_date, full_time) = match parts.as_slice() {
        [d, t] => (*d, *t),
        _ => {
            let parts: Vec<&str> = upper.split(' ').collect();
            match parts.as_slice() {
                [d, t] => (*d, *t),
                _ => return Err(DateParseError::MissingSeparator(text.to_string())),
            }
        }
    };

    let date = NaiveDate::parse_from_str(full_date, "%Y-%m-%d")
        .map_err(|_| DateParseError::BadComponent(text.to_string()))?;

    let partial_time = full_time
        .get(0..8)
        .ok_or_else(|| DateParseError::BadComponent(text.to_string()))?;
    let time = NaiveTime::parse_from_str(partial_time, "%H:%M:%S")
        .map_err(|_| DateParseError::BadComponent(text.to_string()))?;

    let mut offset_pos = 8;
    if full_time.as_bytes().get(offset_pos) == Some(&b'.') {
        offset_pos += 2;
    }
    let offset_text = full_time
        .get(offset_pos..)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DateParseError::BadOffset(text.to_string()))?;

    let offset = if offset_text.starts_with('Z') {
        FixedOffset::east_opt(0)
    } else {
        parse_offset(offset_text)
    }
    .ok_or_else(|| DateParseError::BadOffset(text.to_string()))?;

    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| DateParseError::BadComponent(text.to_string()))
}

/// Parses a `±HH:MM` or `±HHMM` offset suffix.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = s[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// RFC-822-like family: `EEE, dd MMM yyyy HH:mm:ss ±HHMM`.
///
/// A numeric offset is tried first; on failure the non-standard zone
/// abbreviation `MEST` is rewritten to `+02:00` and the parse retried.
/// Other named zones are not handled and fail.
fn parse_rfc822_like(text: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    const FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

    if let Ok(parsed) = DateTime::parse_from_str(text, FORMAT) {
        return Ok(parsed);
    }

    let rewritten = text.replace("MEST", "+02:00");
    DateTime::parse_from_str(&rewritten, FORMAT)
        .map_err(|_| DateParseError::Unrecognized(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    /// Decomposes the parsed instant in a target offset (given in minutes)
    /// and compares calendar fields there.
    fn check(
        input: &str,
        offset_minutes: i32,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) {
        let parsed = parse(input, utc()).expect(input);
        let zone = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let local = parsed.with_timezone(&zone);
        assert_eq!(
            (
                local.year(),
                local.month(),
                local.day(),
                local.hour(),
                local.minute(),
                local.second(),
                local.offset().local_minus_utc() / 60,
            ),
            (year, month, day, hour, minute, second, offset_minutes),
            "decomposing {input:?} in offset {offset_minutes}min",
        );
    }

    #[test]
    fn rfc3339_positive_offset() {
        check("2011-04-01T22:19:05+02:00", 120, 2011, 4, 1, 22, 19, 5);
        check("2011-04-17T22:19:05+02:00", 120, 2011, 4, 17, 22, 19, 5);
        check("2012-04-17T22:19:05+02:00", 120, 2012, 4, 17, 22, 19, 5);
        check("2012-01-17T23:59:59+02:00", 120, 2012, 1, 17, 23, 59, 59);
    }

    #[test]
    fn rfc3339_zulu_decomposed_in_utc() {
        check("2012-03-17T22:19:05Z", 0, 2012, 3, 17, 22, 19, 5);
    }

    #[test]
    fn rfc3339_zulu_decomposed_in_other_zone() {
        check("2012-03-17T22:19:05Z", 60, 2012, 3, 17, 23, 19, 5);
    }

    #[test]
    fn rfc3339_offset_decomposed_in_utc() {
        check("2012-03-17T22:19:05+01:00", 0, 2012, 3, 17, 21, 19, 5);
    }

    #[test]
    fn rfc3339_space_separator() {
        check("2012-03-17 22:19:05Z", 0, 2012, 3, 17, 22, 19, 5);
    }

    #[test]
    fn rfc3339_lowercase() {
        check("2012-03-17t22:19:05z", 0, 2012, 3, 17, 22, 19, 5);
    }

    #[test]
    fn rfc3339_fractional_second_skipped() {
        check("2012-03-17T22:19:05.5Z", 0, 2012, 3, 17, 22, 19, 5);
        check("2012-03-17T22:19:05.5+02:00", 120, 2012, 3, 17, 22, 19, 5);
    }

    #[test]
    fn rfc822_numeric_offset() {
        check("Sun, 17 Jul 2011 21:56:57 +0200", 120, 2011, 7, 17, 21, 56, 57);
        check("Mon, 06 Sep 2010 00:01:00 +0000", 0, 2010, 9, 6, 0, 1, 0);
    }

    #[test]
    fn rfc822_single_digit_day() {
        check("Mon, 6 Sep 2010 00:01:00 +0000", 0, 2010, 9, 6, 0, 1, 0);
    }

    #[test]
    fn rfc822_mest_rewritten() {
        check("Sun, 17 Jul 2011 16:50:25 MEST", 120, 2011, 7, 17, 16, 50, 25);
    }

    #[test]
    fn rfc822_unknown_zone_name_fails() {
        assert!(parse("Sun, 17 Jul 2011 16:50:25 PDT", utc()).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("", utc()).is_err());
        assert!(parse("not a date", utc()).is_err());
        assert!(parse("2011-04-17", utc()).is_err());
        assert!(parse("2011-04-17T22:19", utc()).is_err());
        assert!(parse("2011-04-17T22:19:05", utc()).is_err());
        assert!(parse("2011-04-17T22:19:05+9", utc()).is_err());
    }

    #[test]
    fn fallback_zone_is_inert() {
        let plus_ten = FixedOffset::east_opt(10 * 3600).unwrap();
        let a = parse("2012-03-17T22:19:05Z", utc()).unwrap();
        let b = parse("2012-03-17T22:19:05Z", plus_ten).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.timestamp(), b.timestamp());
    }

    proptest! {
        /// Any chrono-formatted RFC-3339 timestamp with a whole-second
        /// value round-trips through the family-A parser.
        #[test]
        fn rfc3339_round_trip(
            secs in 0i64..4_102_444_800, // 1970..2100
            offset_min in -14 * 60..=14 * 60,
        ) {
            let zone = FixedOffset::east_opt(offset_min * 60).unwrap();
            let original = DateTime::from_timestamp(secs, 0).unwrap().with_timezone(&zone);
            let formatted = original.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
            let parsed = parse(&formatted, utc()).unwrap();
            prop_assert_eq!(parsed.timestamp(), secs);
            prop_assert_eq!(parsed.offset().local_minus_utc(), offset_min * 60);
        }
    }
}
