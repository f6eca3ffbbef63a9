// ABOUTME: Flexible timestamp parsing for upstream video records.
// ABOUTME: Accepts RFC3339 (the API's native format), RFC2822, and zone-less ISO variants as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parses a datetime string using the formats the video API has been seen to emit.
/// Returns UTC datetime if successful, None if no format matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Formats without timezone (assume UTC)
    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    None
}

/// Formats a timestamp the way Atom date constructs expect (`2024-01-15T10:00:00Z`).
pub fn format_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
