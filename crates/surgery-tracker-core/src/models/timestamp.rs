//! Lenient timestamp values.
//!
//! Patient data arrives from web forms and legacy records, so a "timestamp"
//! can be an epoch-millisecond number, a numeric string, a free-form date
//! string, or nothing at all. Resolution to epoch milliseconds never fails;
//! anything unusable resolves to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp as it was recorded, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Timestamp {
    /// Epoch milliseconds.
    Epoch(i64),
    /// Raw text: either digits (epoch ms) or a calendar date.
    Text(String),
    /// Absent or null.
    #[default]
    Missing,
}

/// Naive layouts accepted for date strings without an offset (read as UTC).
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

impl Timestamp {
    /// Resolve to epoch milliseconds.
    ///
    /// Returns `None` for missing values, unparseable text, and values that
    /// are zero or negative.
    pub fn epoch_millis(&self) -> Option<i64> {
        let millis = match self {
            Timestamp::Missing => return None,
            Timestamp::Epoch(ms) => *ms,
            Timestamp::Text(raw) => parse_text(raw.trim())?,
        };
        (millis > 0).then_some(millis)
    }

    /// Whether this value carries anything at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, Timestamp::Missing)
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Timestamp::Epoch(ms)
    }
}

impl From<Option<i64>> for Timestamp {
    fn from(ms: Option<i64>) -> Self {
        ms.map(Timestamp::Epoch).unwrap_or_default()
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Timestamp::Text(raw.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        Timestamp::Text(raw)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Epoch(dt.timestamp_millis())
    }
}

fn parse_text(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        // Overflowing digit strings are unusable, not an error.
        return raw.parse::<i64>().ok();
    }

    parse_calendar_date(raw).map(|dt| dt.timestamp_millis())
}

/// Parse a calendar date string.
///
/// Offset-less strings are interpreted as UTC.
pub fn parse_calendar_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
