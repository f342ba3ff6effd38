//! Parsing of user-supplied date bounds

use crate::error::{Result, StatsError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date or date-time string into a naive UTC instant.
///
/// Inputs with an explicit offset are converted to UTC. A bare date maps to
/// midnight.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(StatsError::ParseError(format!("invalid date '{}'", input)))
}

/// Parse a named query bound into microseconds since the epoch
pub fn parse_bound_micros(name: &str, input: &str) -> Result<i64> {
    let dt = parse_datetime(input)
        .map_err(|_| StatsError::ParseError(format!("invalid {} '{}'", name, input)))?;
    Ok(dt.and_utc().timestamp_micros())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(parse_datetime("2024-01-02").unwrap(), dt("2024-01-02 00:00:00"));
    }

    #[test]
    fn test_naive_datetime_forms() {
        let expected = dt("2024-01-02 13:45:00");
        assert_eq!(parse_datetime("2024-01-02T13:45:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-02 13:45:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-02T13:45").unwrap(), expected);
        assert_eq!(parse_datetime(" 2024-01-02T13:45:00 ").unwrap(), expected);
    }

    #[test]
    fn test_offset_converted_to_utc() {
        assert_eq!(
            parse_datetime("2024-01-02T02:00:00+02:00").unwrap(),
            dt("2024-01-02 00:00:00")
        );
        assert_eq!(
            parse_datetime("2024-01-02T00:00:00Z").unwrap(),
            dt("2024-01-02 00:00:00")
        );
    }

    #[test]
    fn test_fractional_seconds() {
        let parsed = parse_datetime("2024-01-02T00:00:00.250").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_invalid_dates() {
        for input in ["", "yesterday", "2024-13-01", "2024-02-30", "01/02/2024"] {
            assert!(
                matches!(parse_datetime(input), Err(StatsError::ParseError(_))),
                "expected parse error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_bound_error_names_parameter() {
        let err = parse_bound_micros("start_date", "nope").unwrap_err();
        assert_eq!(err.to_string(), "Parse error: invalid start_date 'nope'");
        assert_eq!(parse_bound_micros("end_date", "1970-01-01").unwrap(), 0);
    }
}
