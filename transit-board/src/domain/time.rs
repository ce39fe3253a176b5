//! Upstream timestamp handling.
//!
//! The SIRI endpoints send RFC 3339 instants (`2024-03-15T14:30:00.000Z`),
//! while the graph endpoints send compact local times (`20240315T143000`)
//! in the network's time zone. Both end up as UTC instants here.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Europe::Paris;

const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Parse an upstream timestamp in either supported format.
///
/// Returns `None` for empty or unparseable input: an unknown time, not an error.
/// Compact local times that fall in a DST gap are unknown; ambiguous ones
/// resolve to the earlier instant.
///
/// # Examples
///
/// ```
/// use transit_board::domain::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-15T13:30:00Z").unwrap();
/// let b = parse_timestamp("20240315T143000").unwrap();
/// assert_eq!(a, b);
///
/// assert!(parse_timestamp("").is_none());
/// assert!(parse_timestamp("soon").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, COMPACT_FORMAT).ok()?;
    Paris
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Minutes from `now` until `at`, rounded to the nearest minute and never negative.
pub fn minutes_until(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (at - now).num_milliseconds();
    // Half a minute rounds up, matching how departure boards count down
    (millis.saturating_add(30_000)).div_euclid(60_000).max(0)
}
