// Shared builders for time entry fixtures.

use crate::modules::time_tracking::core::time_entry::TimeEntry;
use chrono::{DateTime, TimeZone, Utc};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid fixture instant")
}

pub struct TimeEntryBuilder {
    inner: TimeEntry,
}

impl TimeEntryBuilder {
    /// Closed session whose stored duration matches its timestamps.
    pub fn closed(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> Self {
        Self {
            inner: TimeEntry {
                id: format!("te-{}", clock_in.timestamp()),
                clock_in,
                clock_out: Some(clock_out),
                duration: Some((clock_out - clock_in).num_seconds()),
                is_active: false,
            },
        }
    }

    pub fn open(clock_in: DateTime<Utc>) -> Self {
        Self {
            inner: TimeEntry {
                id: format!("te-{}", clock_in.timestamp()),
                clock_in,
                clock_out: None,
                duration: None,
                is_active: true,
            },
        }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = v.into();
        self
    }

    pub fn duration(mut self, v: i64) -> Self {
        self.inner.duration = Some(v);
        self
    }

    pub fn no_duration(mut self) -> Self {
        self.inner.duration = None;
        self
    }

    pub fn active(mut self, v: bool) -> Self {
        self.inner.is_active = v;
        self
    }

    pub fn build(self) -> TimeEntry {
        self.inner
    }
}

#[cfg(test)]
mod time_entry_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn closed_should_derive_the_duration_from_the_timestamps() {
        let entry = TimeEntryBuilder::closed(at(2024, 3, 4, 9, 0), at(2024, 3, 4, 17, 0)).build();
        assert_eq!(entry.duration, Some(28_800));
        assert!(!entry.is_active);
        assert_eq!(entry.id, format!("te-{}", at(2024, 3, 4, 9, 0).timestamp()));
    }

    #[rstest]
    fn setters_should_override_the_defaults() {
        let entry = TimeEntryBuilder::open(at(2024, 3, 4, 9, 0))
            .id("custom")
            .duration(5)
            .active(false)
            .build();
        assert_eq!(entry.id, "custom");
        assert_eq!(entry.duration, Some(5));
        assert!(!entry.is_active);
        assert_eq!(entry.clock_out, None);
    }
}
