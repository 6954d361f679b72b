use chrono::{DateTime, FixedOffset};

const APPLE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Parses export timestamps such as `2025-01-02 03:14:00 -0500`, keeping the
/// recorded offset. RFC 3339 is accepted as well since some converters emit it.
pub fn parse_apple_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_str(value, APPLE_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}
