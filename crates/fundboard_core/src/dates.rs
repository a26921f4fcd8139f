//! Flexible date parsing for deadline and extraction-timestamp fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::record::{field, ResultRecord};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Try the timestamp shapes the pipeline and funder sites actually produce:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, bare dates, and a few written-out forms
/// ("31 December 2026", "December 31, 2026"). Anything else is `None`.
pub fn parse_flexible(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&midnight));
        }
    }
    None
}

/// Millisecond timestamp used by the `recent` sort: the record's
/// `extraction_timestamp` if it parses, else its `deadline`, else 0 (epoch),
/// so undated records sink to the bottom of a descending sort.
pub fn sort_timestamp(record: &ResultRecord) -> i64 {
    record
        .text(field::EXTRACTION_TIMESTAMP)
        .as_deref()
        .and_then(parse_flexible)
        .or_else(|| record.text(field::DEADLINE).as_deref().and_then(parse_flexible))
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
