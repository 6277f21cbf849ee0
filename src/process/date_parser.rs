use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a measurement timestamp (e.g. `20230101T000012.3Z` with
/// `%Y%m%dT%H%M%S%.fZ`) into micros since the epoch, UTC.
pub fn parse_timestamp_micros(s: &str, format: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(s.trim(), format)
        .ok()
        .map(|naive| naive.and_utc().timestamp_micros())
}

pub fn micros_to_utc(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}
