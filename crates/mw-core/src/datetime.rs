//! Datetime and timestamp literal parsing, delegated to `chrono`.

use chrono::DateTime;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalError {
    BadDateTime,
    BadTimestamp,
    Overflow,
}

fn scan_to_terminator(line: &[char], start: usize) -> usize {
    let mut pos = start;
    while pos < line.len() && line[pos] != '#' {
        pos += 1;
    }
    pos
}

/// Parses an RFC 3339 datetime literal starting at `line[start..]`, scanning
/// forward to the first `#` (or end of line) and handing that whole slice to
/// `chrono`.
///
/// `line` is indexed by Unicode scalar value, matching the char-indexed
/// positions the caller tracks over `current_line: Vec<char>` — slicing a
/// `&str` by byte offset at a char index would disagree as soon as a
/// multi-byte character appeared earlier on the line, and could land mid
/// codepoint.
pub fn parse_datetime(line: &[char], start: usize) -> Result<(Value, usize), TemporalError> {
    let end = scan_to_terminator(line, start);
    let slice: String = line[start..end].iter().collect();
    let trimmed = slice.trim_end();
    let dt = DateTime::parse_from_rfc3339(trimmed).map_err(|_| TemporalError::BadDateTime)?;
    Ok((Value::DateTime(dt), start + trimmed.chars().count()))
}

/// Parses a Unix-epoch timestamp literal (integer or fractional seconds)
/// starting at `line[start..]`.
pub fn parse_timestamp(line: &[char], start: usize) -> Result<(Value, usize), TemporalError> {
    let end = scan_to_terminator(line, start);
    let slice: String = line[start..end].iter().collect();
    let trimmed = slice.trim_end();
    let seconds: f64 = trimmed.parse().map_err(|_| TemporalError::BadTimestamp)?;
    if !seconds.is_finite() {
        return Err(TemporalError::Overflow);
    }
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds.fract()) * 1_000_000_000.0).round() as u32;
    let dt = DateTime::from_timestamp(whole, nanos).ok_or(TemporalError::Overflow)?;
    Ok((Value::Timestamp(dt), start + trimmed.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn parses_rfc3339_datetime() {
        let line = chars("2024-01-02T03:04:05Z");
        let (v, end) = parse_datetime(&line, 0).unwrap();
        assert!(matches!(v, Value::DateTime(_)));
        assert_eq!(end, line.len());
    }

    #[test]
    fn parses_datetime_with_trailing_comment() {
        let line = chars("2024-01-02T03:04:05+02:00 # note");
        let (v, _) = parse_datetime(&line, 0).unwrap();
        assert!(matches!(v, Value::DateTime(_)));
    }

    #[test]
    fn rejects_bad_datetime() {
        assert_eq!(
            parse_datetime(&chars("not-a-date"), 0),
            Err(TemporalError::BadDateTime)
        );
    }

    #[test]
    fn parses_integer_timestamp() {
        let (v, _) = parse_timestamp(&chars("1700000000"), 0).unwrap();
        match v {
            Value::Timestamp(ts) => assert_eq!(ts.timestamp(), 1_700_000_000),
            _ => panic!("expected Timestamp"),
        }
    }

    #[test]
    fn parses_fractional_timestamp() {
        let (v, _) = parse_timestamp(&chars("1700000000.5"), 0).unwrap();
        match v {
            Value::Timestamp(ts) => assert_eq!(ts.timestamp(), 1_700_000_000),
            _ => panic!("expected Timestamp"),
        }
    }

    #[test]
    fn rejects_bad_timestamp() {
        assert_eq!(
            parse_timestamp(&chars("not-a-number"), 0),
            Err(TemporalError::BadTimestamp)
        );
    }

    #[test]
    fn char_indexed_start_after_multibyte_prefix() {
        let line = chars("café: 2024-01-02T03:04:05Z");
        let start = "café: ".chars().count();
        let (v, _) = parse_datetime(&line, start).unwrap();
        assert!(matches!(v, Value::DateTime(_)));
    }
}
