// Calendar windows in the viewer's local time.
//
// Purpose
// - Turn a reference instant plus an offset into half-open [start, end) day and week windows.
//
// Notes
// - Windows are bounded by local midnights, so consecutive windows always tile without gaps,
//   also across daylight saving transitions (a DST day is 23h or 25h long).
// - Offsets past the supported date range saturate at its ends and yield windows no entry falls in.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The window of equal length immediately before this one.
    pub fn preceding(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self
                .start
                .checked_sub_signed(length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self.start,
        }
    }
}

/// `date` moved by `days`, saturating at the ends of the supported calendar.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    match Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta)) {
        Some(shifted) => shifted,
        None if days < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCalendar {
    pub tz: Tz,
    pub week_start: Weekday,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            tz: chrono_tz::UTC,
            week_start: Weekday::Sun,
        }
    }
}

impl WorkCalendar {
    pub fn new(tz: Tz, week_start: Weekday) -> Self {
        Self { tz, week_start }
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// First instant of the given local date.
    pub fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(instant) => instant.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Midnight skipped by a DST jump: the day starts at the first valid local time.
            LocalResult::None => self
                .tz
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
        }
    }

    pub fn day_window(&self, date: NaiveDate) -> TimeWindow {
        TimeWindow::new(self.start_of(date), self.start_of(shift_days(date, 1)))
    }

    pub fn week_start_date(&self, date: NaiveDate) -> NaiveDate {
        let since_start = (date.weekday().num_days_from_monday() + 7
            - self.week_start.num_days_from_monday())
            % 7;
        shift_days(date, -i64::from(since_start))
    }

    /// Week containing `now + 7 * week_offset` days.
    pub fn week_window(&self, now: DateTime<Utc>, week_offset: i32) -> TimeWindow {
        let first = self.first_day_of_week(now, week_offset);
        TimeWindow::new(self.start_of(first), self.start_of(shift_days(first, 7)))
    }

    pub fn week_days(&self, now: DateTime<Utc>, week_offset: i32) -> Vec<NaiveDate> {
        let first = self.first_day_of_week(now, week_offset);
        (0..7).map(|i| shift_days(first, i)).collect()
    }

    fn first_day_of_week(&self, now: DateTime<Utc>, week_offset: i32) -> NaiveDate {
        let shifted = shift_days(self.date_of(now), 7 * i64::from(week_offset));
        self.week_start_date(shifted)
    }
}

#[cfg(test)]
mod work_calendar_tests {
    use super::*;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[rstest]
    #[case(Weekday::Sun, utc(2024, 3, 3, 0, 0))]
    #[case(Weekday::Mon, utc(2024, 3, 4, 0, 0))]
    fn it_should_start_the_week_on_the_configured_weekday(
        #[case] week_start: Weekday,
        #[case] expected_start: DateTime<Utc>,
    ) {
        let calendar = WorkCalendar::new(chrono_tz::UTC, week_start);
        // Wednesday
        let window = calendar.week_window(utc(2024, 3, 6, 12, 0), 0);
        assert_eq!(window.start, expected_start);
        assert_eq!(window.end, expected_start + Duration::days(7));
    }

    #[rstest]
    fn it_should_shift_the_week_by_the_offset() {
        let calendar = WorkCalendar::new(chrono_tz::UTC, Weekday::Mon);
        let now = utc(2024, 3, 6, 12, 0);
        let previous = calendar.week_window(now, -1);
        let current = calendar.week_window(now, 0);
        assert_eq!(previous.end, current.start);
        assert_eq!(previous.start, utc(2024, 2, 26, 0, 0));
        assert_eq!(current.preceding(), previous);
    }

    #[rstest]
    fn it_should_use_local_midnight_for_day_windows() {
        let calendar = WorkCalendar::new(chrono_tz::Europe::Amsterdam, Weekday::Mon);
        let window = calendar.day_window(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(window.start, utc(2024, 1, 14, 23, 0));
        assert_eq!(window.end, utc(2024, 1, 15, 23, 0));
    }

    #[rstest]
    fn it_should_shorten_the_day_across_a_dst_jump() {
        let calendar = WorkCalendar::new(chrono_tz::Europe::Amsterdam, Weekday::Mon);
        let window = calendar.day_window(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(window.end - window.start, Duration::hours(23));
    }

    #[rstest]
    fn it_should_list_the_seven_days_of_the_week() {
        let calendar = WorkCalendar::default();
        let days = calendar.week_days(utc(2024, 3, 6, 12, 0), 0);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[rstest]
    fn window_should_be_half_open() {
        let window = TimeWindow::new(utc(2024, 3, 4, 0, 0), utc(2024, 3, 5, 0, 0));
        assert!(window.contains(utc(2024, 3, 4, 0, 0)));
        assert!(!window.contains(utc(2024, 3, 5, 0, 0)));
    }

    #[rstest]
    #[case(i32::MAX)]
    #[case(i32::MIN)]
    #[case(99_999_999)]
    fn it_should_saturate_offsets_past_the_calendar(#[case] week_offset: i32) {
        let calendar = WorkCalendar::new(chrono_tz::Europe::Amsterdam, Weekday::Mon);
        let window = calendar.week_window(utc(2024, 3, 6, 12, 0), week_offset);
        assert!(window.start <= window.end);
        assert!(!window.contains(utc(2024, 3, 6, 12, 0)));
        assert_eq!(calendar.week_days(utc(2024, 3, 6, 12, 0), week_offset).len(), 7);
    }

    #[rstest]
    #[case(NaiveDate::MAX, 1, NaiveDate::MAX)]
    #[case(NaiveDate::MIN, -1, NaiveDate::MIN)]
    #[case(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(), 2, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())]
    fn it_should_shift_days_without_overflowing(
        #[case] date: NaiveDate,
        #[case] days: i64,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(shift_days(date, days), expected);
    }
}
