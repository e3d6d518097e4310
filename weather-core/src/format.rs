//! Display strings for timestamps and measurements (en-US conventions).

use chrono::{DateTime, Datelike, NaiveTime, TimeZone};
use std::fmt::Display;

/// "Monday, October 19, 2026"
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%A, %B %-d, %Y").to_string()
}

/// "3:05 PM"
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%-I:%M %p").to_string()
}

/// Hour-of-day label, e.g. `0` -> "12 AM", `15` -> "3 PM". Wraps past 23.
pub fn format_hour(hour: u32) -> String {
    NaiveTime::from_hms_opt(hour % 24, 0, 0)
        .map(|t| t.format("%-I %p").to_string())
        .unwrap_or_default()
}

/// Short weekday label, "Mon". Accepts dates and date-times alike.
pub fn format_day(at: &impl Datelike) -> String {
    at.weekday().to_string()
}

/// Rounds half-up, so -2.5 becomes -2 and 2.5 becomes 3.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn format_updated<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("Updated: {}", format_time(at))
}
