use chrono::{Local, TimeZone, Utc};

/// Get current Unix timestamp (milliseconds, UTC)
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix timestamp (milliseconds) as `HH:MM:SS` in the local timezone.
///
/// Out-of-range values fall back to the raw number.
pub fn format_local_time(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}
