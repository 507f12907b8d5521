//! Human-readable formatting for file sizes, durations, and dates.

use chrono::{Local, TimeZone};

const SI_UNIT: f64 = 1000.0;
const SI_PREFIXES: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count using SI units (1000-based), e.g. `1.7 kB`, `7.1 MB`.
pub fn human_size(bytes: u64) -> String {
    if bytes < SI_UNIT as u64 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= SI_UNIT && unit < SI_PREFIXES.len() {
        value /= SI_UNIT;
        unit += 1;
    }

    format!("{:.1} {}", value, SI_PREFIXES[unit - 1])
}

/// Format a duration as `mm:ss`, or `h:mm:ss` once it crosses an hour.
pub fn human_duration_short(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Format a duration in words, e.g. `42 sec`, `3 min 5 sec`, `1 hr 2 min 3 sec`.
pub fn human_duration_detailed(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if total_secs < 60 {
        format!("{} sec", seconds)
    } else if hours < 1 {
        format!("{} min {} sec", minutes, seconds)
    } else {
        format!("{} hr {} min {} sec", hours, minutes, seconds)
    }
}

/// Format an epoch-millisecond timestamp as a local date, e.g. `28-10-2025, 09:41 AM`.
pub fn human_date(epoch_ms: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.format("%d-%m-%Y, %I:%M %p").to_string())
        .unwrap_or_else(|| "-".to_string())
}
