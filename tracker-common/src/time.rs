//! Timestamp utilities
//!
//! Tracker timestamps are stored without timezone. Every timestamp exposed as
//! text goes through [`to_iso8601_no_tz`] so all fields share one format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Canonical text format: `yyyy-MM-ddTHH:mm:ss.SSS`
pub const ISO8601_NO_TZ: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Layouts accepted when a timestamp arrives as text
const TEXT_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Render a timestamp in the canonical no-timezone form
pub fn to_iso8601_no_tz(ts: &NaiveDateTime) -> String {
    ts.format(ISO8601_NO_TZ).to_string()
}

/// Parse a stored timestamp
///
/// Accepts the layouts databases emit for `timestamp without time zone`,
/// RFC 3339 strings (converted to UTC wall time) and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    for layout in TEXT_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
