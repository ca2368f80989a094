// Hours per window, per day and per week.
//
// Boundaries
// - Pure functions over an entry slice and one reference instant. Calling them twice with the same
//   inputs yields the same output.

use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::core::calendar::{TimeWindow, WorkCalendar};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn seconds_in_window(entries: &[TimeEntry], window: &TimeWindow, now: DateTime<Utc>) -> f64 {
    entries
        .iter()
        .map(|entry| entry.overlap_seconds(window, now))
        .sum()
}

/// Hours attributed to `window`, rounded to two decimals.
pub fn hours_in_window(entries: &[TimeEntry], window: &TimeWindow, now: DateTime<Utc>) -> f64 {
    round2(seconds_in_window(entries, window, now) / SECONDS_PER_HOUR)
}

/// Hours worked on a local date, formatted as `"Hh Mm Ss"`.
pub fn hours_for_day(
    entries: &[TimeEntry],
    date: NaiveDate,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> String {
    format_hms(seconds_in_window(entries, &calendar.day_window(date), now))
}

pub fn weekly_hours(
    entries: &[TimeEntry],
    week_offset: i32,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> f64 {
    hours_in_window(entries, &calendar.week_window(now, week_offset), now)
}

/// Distinct local dates with a session inside `window`.
///
/// A session that started before the window counts on the window's first day.
pub fn days_worked(
    entries: &[TimeEntry],
    window: &TimeWindow,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> usize {
    entries
        .iter()
        .filter(|entry| entry.touches(window, now))
        .map(|entry| calendar.date_of(entry.clock_in.max(window.start)))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Sessions touching `window`.
pub fn sessions_in_window(entries: &[TimeEntry], window: &TimeWindow, now: DateTime<Utc>) -> usize {
    entries
        .iter()
        .filter(|entry| entry.touches(window, now))
        .count()
}

pub fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).round() as u64
    } else {
        0
    };
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}
