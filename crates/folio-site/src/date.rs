//! Lenient date parsing for `date` metadata.
//!
//! Dates are written by hand, so several common shapes are accepted. Values
//! without a time or offset are taken as midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date/time formats tried after RFC 3339 and RFC 2822.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only formats. `%B` also accepts abbreviated month names.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%B %d %Y", "%B %d, %Y"];

/// Error returned when a date value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognised date: {0:?}")]
pub struct DateError(pub String);

/// Parse a metadata date value.
///
/// # Errors
///
/// Returns [`DateError`] if the value matches none of the accepted formats.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
        }
    }

    Err(DateError(value.to_owned()))
}
