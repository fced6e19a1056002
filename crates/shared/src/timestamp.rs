//! Timestamp formatting for device audit rows.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Formats the time-of-day column of an audit row as `HH:MM:SS`.
pub fn log_time(now: &NaiveDateTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Formats the date column of an audit row as `D-M-YYYY`.
///
/// Day and month are not zero-padded; existing rows in the `DeviceLogs`
/// table use this layout.
pub fn log_date(now: &NaiveDateTime) -> String {
    format!("{}-{}-{}", now.day(), now.month(), now.year())
}
