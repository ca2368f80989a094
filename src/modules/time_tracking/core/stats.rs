// Derived summaries: weekly stats, the per-day breakdown and the dashboard summary.
//
// Boundaries
// - Computed fresh from an entry slice and one reference instant; never cached or persisted.

use crate::modules::time_tracking::core::aggregate::{
    days_worked, hours_in_window, round2, sessions_in_window, weekly_hours,
};
use crate::modules::time_tracking::core::analytics::{
    FULL_DAY_HOURS, Trend, current_streak, longest_streak, productivity_score, trend,
};
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::core::calendar::WorkCalendar;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::Serialize;

pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub total_hours: f64,
    pub days_worked: usize,
    pub average_daily: f64,
    /// Percentage of the weekly target, rounded.
    pub progress: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hours: f64,
    pub sessions: usize,
    pub productivity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_hours: f64,
    pub days_logged: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_hours_per_day: f64,
    pub productivity_score: u8,
    pub weekly_trend: Trend,
    pub monthly_trend: Trend,
    pub recent_activity: Vec<TimeEntry>,
    pub daily_breakdown: Vec<DayBreakdown>,
    pub insights: Vec<String>,
}

pub fn weekly_stats(
    entries: &[TimeEntry],
    week_offset: i32,
    target_hours: f64,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> WeeklyStats {
    let window = calendar.week_window(now, week_offset);
    let total_hours = weekly_hours(entries, week_offset, now, calendar);
    let days = days_worked(entries, &window, now, calendar);
    let average_daily = if days > 0 {
        round2(total_hours / days as f64)
    } else {
        0.0
    };
    let previous_hours = weekly_hours(entries, week_offset.saturating_sub(1), now, calendar);

    WeeklyStats {
        total_hours,
        days_worked: days,
        average_daily,
        progress: progress_percent(total_hours, target_hours),
        trend: Trend::classify(total_hours, previous_hours),
    }
}

fn progress_percent(total_hours: f64, target_hours: f64) -> u32 {
    if target_hours <= 0.0 || !target_hours.is_finite() {
        return 0;
    }
    (total_hours / target_hours * 100.0).round().max(0.0) as u32
}

pub fn daily_breakdown(
    entries: &[TimeEntry],
    week_offset: i32,
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> Vec<DayBreakdown> {
    calendar
        .week_days(now, week_offset)
        .into_iter()
        .map(|date| {
            let window = calendar.day_window(date);
            let hours = hours_in_window(entries, &window, now);
            let productivity = (hours / FULL_DAY_HOURS * 100.0).round().clamp(0.0, 100.0) as u8;
            DayBreakdown {
                date,
                weekday: date.weekday(),
                hours,
                sessions: sessions_in_window(entries, &window, now),
                productivity,
            }
        })
        .collect()
}

pub fn dashboard_stats(
    entries: &[TimeEntry],
    now: DateTime<Utc>,
    calendar: &WorkCalendar,
) -> DashboardStats {
    let week = calendar.week_window(now, 0);
    let total_hours = hours_in_window(entries, &week, now);
    let days_logged = days_worked(entries, &week, now, calendar);
    let average_hours_per_day = if days_logged > 0 {
        total_hours / days_logged as f64
    } else {
        0.0
    };

    let mut stats = DashboardStats {
        total_hours,
        days_logged,
        current_streak: current_streak(entries, calendar.date_of(now), calendar),
        longest_streak: longest_streak(entries, calendar),
        average_hours_per_day: round2(average_hours_per_day),
        productivity_score: productivity_score(average_hours_per_day, days_logged),
        weekly_trend: trend(entries, 7, now, calendar),
        monthly_trend: trend(entries, 30, now, calendar),
        recent_activity: entries.iter().take(RECENT_ACTIVITY_LIMIT).cloned().collect(),
        daily_breakdown: daily_breakdown(entries, 0, now, calendar),
        insights: Vec::new(),
    };
    stats.insights = insights(&stats);
    stats
}

pub fn insights(stats: &DashboardStats) -> Vec<String> {
    let mut insights = Vec::new();

    if stats.current_streak > 0 {
        insights.push(format!(
            "You're on a {}-day streak! Keep it up!",
            stats.current_streak
        ));
    }

    if stats.average_hours_per_day < 4.0 {
        insights.push("Consider logging more hours to improve your productivity score.".into());
    } else if stats.average_hours_per_day > 8.0 {
        insights.push("Great work! You are consistently logging full workdays.".into());
    }

    match stats.weekly_trend {
        Trend::Up => {
            insights.push("Your weekly hours are trending upward, excellent progress!".into())
        }
        Trend::Down => insights
            .push("Your weekly hours have decreased. Consider reviewing your schedule.".into()),
        Trend::Stable => {}
    }

    if stats.productivity_score > 80 {
        insights.push("Outstanding productivity! You are in the top tier of performers.".into());
    } else if stats.productivity_score < 50 {
        insights.push("Focus on consistency to improve your productivity score.".into());
    }

    insights
}
