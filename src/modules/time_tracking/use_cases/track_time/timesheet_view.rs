// One compute pass over an entry snapshot.
//
// Purpose
// - Bind an entry list to a single reference instant so that every figure read from the view
//   agrees with every other one.
//
// Boundaries
// - Used for the viewer's own entries (through the store) and for a teammate's entries alike.
// - Immutable. Take a new view to advance "now".

use crate::modules::time_tracking::core::aggregate::{hours_for_day, weekly_hours};
use crate::modules::time_tracking::core::stats::{
    DashboardStats, DayBreakdown, WeeklyStats, daily_breakdown, dashboard_stats, weekly_stats,
};
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::core::calendar::WorkCalendar;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TimesheetView {
    entries: Arc<[TimeEntry]>,
    now: DateTime<Utc>,
    tick: u64,
    calendar: WorkCalendar,
}

impl TimesheetView {
    pub fn new(entries: Arc<[TimeEntry]>, now: DateTime<Utc>, calendar: WorkCalendar) -> Self {
        Self {
            entries,
            now,
            tick: 0,
            calendar,
        }
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Live clock tick this view was taken at.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.date_of(self.now)
    }

    pub fn open_session(&self) -> Option<&TimeEntry> {
        self.entries.iter().find(|entry| entry.is_open())
    }

    /// Whole seconds elapsed in the open session.
    pub fn open_session_seconds(&self) -> Option<i64> {
        self.open_session()
            .map(|entry| (self.now - entry.clock_in).num_seconds().max(0))
    }

    pub fn weekly_hours(&self, week_offset: i32) -> f64 {
        weekly_hours(&self.entries, week_offset, self.now, &self.calendar)
    }

    pub fn hours_for_day(&self, date: NaiveDate) -> String {
        hours_for_day(&self.entries, date, self.now, &self.calendar)
    }

    pub fn hours_today(&self) -> String {
        self.hours_for_day(self.today())
    }

    pub fn stats_for_week(&self, week_offset: i32, target_hours: f64) -> WeeklyStats {
        weekly_stats(
            &self.entries,
            week_offset,
            target_hours,
            self.now,
            &self.calendar,
        )
    }

    pub fn daily_breakdown(&self, week_offset: i32) -> Vec<DayBreakdown> {
        daily_breakdown(&self.entries, week_offset, self.now, &self.calendar)
    }

    pub fn dashboard(&self) -> DashboardStats {
        dashboard_stats(&self.entries, self.now, &self.calendar)
    }
}

#[cfg(test)]
mod timesheet_view_tests {
    use super::*;
    use crate::tests::fixtures::entries::{TimeEntryBuilder, at};
    use chrono::{Duration, Weekday};
    use rstest::{fixture, rstest};

    #[fixture]
    fn view() -> TimesheetView {
        let now = at(2024, 3, 6, 12, 0);
        let entries: Arc<[TimeEntry]> = vec![
            TimeEntryBuilder::open(now - Duration::minutes(30)).build(),
            TimeEntryBuilder::closed(at(2024, 3, 4, 9, 0), at(2024, 3, 4, 17, 0)).build(),
        ]
        .into();
        TimesheetView::new(entries, now, WorkCalendar::new(chrono_tz::UTC, Weekday::Mon))
    }

    #[rstest]
    fn every_figure_should_agree_within_one_view(view: TimesheetView) {
        let week = view.weekly_hours(0);
        assert_eq!(week, 8.5);
        assert_eq!(view.stats_for_week(0, 40.0).total_hours, week);
        assert_eq!(view.dashboard().total_hours, week);
        let per_day: f64 = view.daily_breakdown(0).iter().map(|day| day.hours).sum();
        assert_eq!(per_day, week);
    }

    #[rstest]
    fn it_should_expose_the_open_session(view: TimesheetView) {
        assert_eq!(view.open_session_seconds(), Some(1_800));
        assert_eq!(view.hours_today(), "0h 30m 0s");
        assert_eq!(view.today(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }

    #[rstest]
    fn it_should_carry_the_tick(view: TimesheetView) {
        assert_eq!(view.tick(), 0);
        assert_eq!(view.with_tick(7).tick(), 7);
    }
}
