//! # Carrier Date Parsing
//!
//! Carrier activity timestamps arrive as free-form strings in a handful of
//! formats, sometimes empty, sometimes a synthetic epoch placeholder. This
//! module is the single place that decides what parses and what counts as
//! valid.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CoreError, CoreResult};

/// Accepted carrier timestamp formats, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

/// Accepted date-only formats (midnight UTC assumed).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y"];

/// Parses a carrier timestamp string into UTC.
///
/// Carrier payloads carry no timezone; timestamps are taken as UTC. Returns
/// `CoreError::InvalidDate` when no accepted format matches.
pub fn parse_carrier_date(raw: &str) -> CoreResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidDate(raw.to_string()));
    }

    // RFC3339 with offset, e.g. "2026-01-10T08:30:00Z"
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(CoreError::InvalidDate(raw.to_string()))
}

/// Parses a carrier timestamp, rejecting synthetic placeholders.
///
/// Returns `None` when the string is empty, unparseable, or an
/// epoch-equivalent sentinel (the carrier emits `1970-01-01 00:00:00` for
/// "no date").
pub fn parse_valid_carrier_date(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_carrier_date(raw).ok()?;
    if parsed.timestamp() == 0 {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_datetime_formats() {
        let dt = parse_carrier_date("2026-01-10 08:30:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 1, 10));
        assert_eq!(dt.hour(), 8);

        let dt = parse_carrier_date("2026-01-10T08:30:00").unwrap();
        assert_eq!(dt.hour(), 8);

        let dt = parse_carrier_date("2026-01-10T08:30:00Z").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_carrier_date("2026-01-12").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 1, 12));
        assert_eq!(dt.hour(), 0);

        let dt = parse_carrier_date("12-01-2026").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 1, 12));
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(parse_carrier_date("").is_err());
        assert!(parse_carrier_date("   ").is_err());
        assert!(parse_carrier_date("not-a-date").is_err());
    }

    #[test]
    fn test_valid_rejects_epoch_placeholder() {
        assert!(parse_valid_carrier_date("1970-01-01 00:00:00").is_none());
        assert!(parse_valid_carrier_date("01-01-1970").is_none());
        assert!(parse_valid_carrier_date("").is_none());
        assert!(parse_valid_carrier_date("2026-01-10").is_some());
    }
}
