//! Report exporters and the cell formatting they share.

use chrono::{Duration, NaiveTime};

pub mod csv;
pub mod pdf;

pub const EMPTY_CELL: &str = "-";

/// `HH:MM:SS`, or `-` when unset.
pub fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// `HH:MM`, or `-` when unset.
pub fn format_time_short(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// Zero-padded `HH:MM`. Missing and zero durations both print as `-`.
pub fn format_duration_padded(duration: Option<Duration>) -> String {
    hours_minutes(duration)
        .map(|(h, m)| format!("{:02}:{:02}", h, m))
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// `H:MM` with unpadded hours. Missing and zero durations both print as `-`.
pub fn format_duration(duration: Option<Duration>) -> String {
    hours_minutes(duration)
        .map(|(h, m)| format!("{}:{:02}", h, m))
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn hours_minutes(duration: Option<Duration>) -> Option<(i64, i64)> {
    let seconds = duration?.num_seconds();
    if seconds == 0 {
        return None;
    }
    Some((seconds / 3600, (seconds % 3600) / 60))
}
