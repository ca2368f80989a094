// Streaks, trends and the productivity score.
//
// Boundaries
// - Pure functions. Activity days are local calendar dates of `clock_in`.

use crate::modules::time_tracking::core::aggregate::SECONDS_PER_HOUR;
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::core::calendar::{TimeWindow, WorkCalendar, shift_days};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Differences within this many hours are reported as stable.
pub const TREND_DEAD_BAND_HOURS: f64 = 2.0;

pub const FULL_DAY_HOURS: f64 = 8.0;
pub const CONSISTENCY_PERIOD_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn classify(recent_hours: f64, previous_hours: f64) -> Self {
        let diff = recent_hours - previous_hours;
        if diff > TREND_DEAD_BAND_HOURS {
            Trend::Up
        } else if diff < -TREND_DEAD_BAND_HOURS {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

pub fn active_days(entries: &[TimeEntry], calendar: &WorkCalendar) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .map(|entry| calendar.date_of(entry.clock_in))
        .collect()
}

/// Consecutive active days ending today. Zero when today has no activity.
pub fn current_streak(entries: &[TimeEntry], today: NaiveDate, calendar: &WorkCalendar) -> u32 {
    let days = active_days(entries, calendar);
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

pub fn longest_streak(entries: &[TimeEntry], calendar: &WorkCalendar) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in active_days(entries, calendar) {
        run = match previous {
            Some(prev) if (day - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Stored hours of completed sessions that clocked in inside `window`.
pub fn completed_hours(entries: &[TimeEntry], window: &TimeWindow) -> f64 {
    let seconds: i64 = entries
        .iter()
        .filter(|entry| entry.clock_out.is_some() && window.contains(entry.clock_in))
        .filter_map(|entry| entry.duration)
        .filter(|duration| *duration > 0)
        .sum();
    seconds as f64 / SECONDS_PER_HOUR
}

/// The last `period_days` local days, today included.
pub fn recent_period(now: DateTime<Utc>, period_days: u32, calendar: &WorkCalendar) -> TimeWindow {
    let today = calendar.date_of(now);
    let first = shift_days(today, 1 - i64::from(period_days));
    TimeWindow::new(calendar.start_of(first), calendar.start_of(shift_days(today, 1)))
}

/// Compares the last `period_days` days against the equally long period before it.
pub fn trend(
    entries: &[TimeEntry],
    period_days: u32,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> Trend {
    if period_days == 0 {
        return Trend::Stable;
    }
    let recent = recent_period(now, period_days, calendar);
    let first_recent_day = calendar.date_of(recent.start);
    let previous = TimeWindow::new(
        calendar.start_of(shift_days(first_recent_day, -i64::from(period_days))),
        recent.start,
    );
    Trend::classify(
        completed_hours(entries, &recent),
        completed_hours(entries, &previous),
    )
}

/// Volume (average hours per logged day against a full day) and consistency (days logged out of
/// a fixed 30-day period), each worth up to 50 points.
pub fn productivity_score(average_hours_per_day: f64, days_logged: usize) -> u8 {
    let volume = average_hours_per_day.max(0.0) / FULL_DAY_HOURS * 50.0;
    let consistency = days_logged as f64 / CONSISTENCY_PERIOD_DAYS * 50.0;
    let score = (volume + consistency).round();
    if score.is_finite() {
        score.clamp(0.0, 100.0) as u8
    } else {
        0
    }
}
