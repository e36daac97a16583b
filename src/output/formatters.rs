//! Reusable formatting utilities for CLI output
//!
//! Timestamps are kept in UTC everywhere else; conversion to the viewer's
//! zone happens only here, at display time.

use chrono::{DateTime, Local, Utc};

/// Format a UTC instant as local date/time.
///
/// # Example output
/// `01/15/2025 14:30 EST`
pub fn format_local(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local);
    let date_time = local.format("%m/%d/%Y %H:%M").to_string();
    let tz_abbrev = offset_to_tz_abbrev(local.offset().local_minus_utc());
    format!("{} {}", date_time, tz_abbrev)
}

/// Convert UTC offset (seconds) to timezone abbreviation.
///
/// Maps common UTC offsets to standard timezone abbreviations. Falls back to
/// `UTC+N` format for uncommon offsets.
pub fn offset_to_tz_abbrev(offset_secs: i32) -> String {
    let offset_hours = offset_secs / 3600;
    let abbrev = match offset_hours {
        -10 => "HST",
        -9 => "AKST",
        -8 => "PST",
        -7 => "MST",
        -6 => "CST",
        -5 => "EST",
        -4 => "EDT",
        0 => "UTC",
        1 => "CET",
        2 => "EET",
        9 => "JST",
        10 => "AEST",
        _ => return format!("UTC{:+}", offset_hours),
    };
    abbrev.to_string()
}

/// Shorten to `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
