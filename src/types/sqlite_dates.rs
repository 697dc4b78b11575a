//! SQLite date/time decoding.
//!
//! SQLite has no native temporal storage class; dates arrive either as an
//! integer (milliseconds since the Unix epoch) or as a string in one of the
//! formats listed at <https://sqlite.org/lang_datefunc.html#tmval>. The
//! string shape is detected from characteristic character positions and the
//! total length, then parsed with the matching chrono format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::driver::DbCursor;
use crate::{Result, RowkitError};
use super::value::Value;

/// Every string format the cascade recognises.
pub const KNOWN_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.3f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.3f",
    "%H:%M",
    "%H:%M:%S",
    "%H:%M:%S%.3f",
    "%H:%MZ",
    "%H:%M:%SZ",
    "%H:%M:%S%.3fZ",
    "%Y-%m-%d %H:%MZ",
    "%Y-%m-%d %H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S%.3fZ",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
];

/// Read a DATE column from a SQLite result, which stores either epoch
/// milliseconds or a formatted string.
pub fn read_sqlite_date(cursor: &dyn DbCursor, index: usize) -> Result<Value> {
    match cursor.get_raw(index)? {
        None => Ok(Value::Null),
        Some(Value::Long(millis)) => DateTime::from_timestamp_millis(millis)
            .map(Value::Timestamp)
            .ok_or_else(|| {
                RowkitError::ConversionParse(format!(
                    "epoch value {millis} is out of range for a timestamp"
                ))
            }),
        Some(Value::Text(text)) => parse_sqlite_date(&text).map(Value::Timestamp),
        Some(other) => Err(RowkitError::Unsupported(format!(
            "conversion from {other:?} to a date is not supported"
        ))),
    }
}

/// Parse one of the known SQLite date/time string formats.
///
/// Time-only values are anchored to 1970-01-01, date-only values to
/// midnight, both on the UTC timeline. A string matching none of the known
/// shapes is an unsupported-operation error.
pub fn parse_sqlite_date(text: &str) -> Result<DateTime<Utc>> {
    let bytes = text.as_bytes();
    let parsed = if bytes.len() > 2 && bytes[2] == b':' {
        // time-only formats
        match text.len() {
            5 => parse_time(text, "%H:%M"),
            6 => parse_time(text, "%H:%MZ"),
            8 => parse_time(text, "%H:%M:%S"),
            9 => parse_time(text, "%H:%M:%SZ"),
            12 => parse_time(text, "%H:%M:%S%.3f"),
            13 => parse_time(text, "%H:%M:%S%.3fZ"),
            _ => None,
        }
    } else if bytes.len() > 10 && bytes[10] == b'T' {
        match text.len() {
            16 => parse_datetime(text, "%Y-%m-%dT%H:%M"),
            17 => parse_datetime(text, "%Y-%m-%dT%H:%MZ"),
            19 => parse_datetime(text, "%Y-%m-%dT%H:%M:%S"),
            20 => parse_datetime(text, "%Y-%m-%dT%H:%M:%SZ"),
            23 => parse_datetime(text, "%Y-%m-%dT%H:%M:%S%.3f"),
            24 => parse_datetime(text, "%Y-%m-%dT%H:%M:%S%.3fZ"),
            _ => None,
        }
    } else {
        match text.len() {
            10 => parse_date(text, "%Y-%m-%d"),
            16 => parse_datetime(text, "%Y-%m-%d %H:%M"),
            17 => parse_datetime(text, "%Y-%m-%d %H:%MZ"),
            19 => parse_datetime(text, "%Y-%m-%d %H:%M:%S"),
            20 => parse_datetime(text, "%Y-%m-%d %H:%M:%SZ"),
            23 => parse_datetime(text, "%Y-%m-%d %H:%M:%S%.3f"),
            24 => parse_datetime(text, "%Y-%m-%d %H:%M:%S%.3fZ"),
            _ => None,
        }
    };
    parsed.ok_or_else(|| {
        RowkitError::Unsupported(format!("cannot convert '{text}' to a date"))
    })
}

fn parse_date(text: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_time(text: &str, format: &str) -> Option<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(text, format).ok()?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    Some(epoch.and_time(time).and_utc())
}

fn parse_datetime(text: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_date_only() {
        let parsed = parse_sqlite_date("2023-10-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_combined_t_separator_with_millis_and_zone() {
        let parsed = parse_sqlite_date("2023-10-01T12:30:00.000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 10, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn parses_time_only_anchored_to_epoch() {
        let parsed = parse_sqlite_date("12:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(1970, 1, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn parses_every_documented_format() {
        let samples = [
            "2023-10-01",
            "2023-10-01 12:30",
            "2023-10-01 12:30:45",
            "2023-10-01 12:30:45.123",
            "2023-10-01T12:30",
            "2023-10-01T12:30:45",
            "2023-10-01T12:30:45.123",
            "12:30",
            "12:30:45",
            "12:30:45.123",
            "12:30Z",
            "12:30:45Z",
            "12:30:45.123Z",
            "2023-10-01 12:30Z",
            "2023-10-01 12:30:45Z",
            "2023-10-01 12:30:45.123Z",
            "2023-10-01T12:30Z",
            "2023-10-01T12:30:45Z",
            "2023-10-01T12:30:45.123Z",
        ];
        assert_eq!(samples.len(), KNOWN_FORMATS.len());
        for sample in samples {
            parse_sqlite_date(sample)
                .unwrap_or_else(|e| panic!("'{sample}' should parse: {e}"));
        }
    }

    #[test]
    fn fractional_seconds_are_preserved() {
        let parsed = parse_sqlite_date("2023-10-01 12:30:45.123").unwrap();
        assert_eq!(
            parsed.timestamp_millis(),
            Utc.with_ymd_and_hms(2023, 10, 1, 12, 30, 45).unwrap().timestamp_millis() + 123
        );
    }

    #[test]
    fn unrecognised_format_is_unsupported() {
        for sample in ["01/10/2023", "2023-10-01 12", "not a date", "12:3"] {
            assert!(matches!(
                parse_sqlite_date(sample),
                Err(RowkitError::Unsupported(_))
            ));
        }
    }
}
