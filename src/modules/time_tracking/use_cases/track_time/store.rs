// Time tracking store.
//
// Purpose
// - Single source of truth for the viewer's own entries during a session.
//
// Responsibilities
// - Poll the backend on a fixed interval and on demand.
// - Replace the snapshot only when the fetched entries differ, in one assignment.
// - Drop responses that were overtaken by a newer refresh or a local merge.
// - Own the Live Session Clock lifecycle.
//
// Boundaries
// - A failed refresh keeps the previous snapshot. Errors are reported, never fatal.

use crate::modules::time_tracking::core::stats::{DashboardStats, WeeklyStats};
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::modules::time_tracking::use_cases::track_time::live_clock::{
    ClockState, LiveSessionClock,
};
use crate::modules::time_tracking::use_cases::track_time::timesheet_view::TimesheetView;
use crate::shared::core::calendar::WorkCalendar;
use crate::shared::core::clock::Clock;
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch time entries: {0}")]
    Fetch(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    Unchanged,
    /// A newer refresh or merge was applied while this one was in flight.
    Stale,
}

#[derive(Default)]
struct Snapshot {
    entries: Arc<[TimeEntry]>,
    loaded: bool,
    applied_seq: u64,
    dashboard: Option<DashboardStats>,
}

pub struct TimeTrackingStore<B: TimeTrackingBackend + 'static> {
    backend: Arc<B>,
    clock: Arc<dyn Clock>,
    calendar: WorkCalendar,
    live_clock: LiveSessionClock,
    poll_interval: Duration,
    issued_seq: AtomicU64,
    snapshot: RwLock<Snapshot>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl<B: TimeTrackingBackend + 'static> TimeTrackingStore<B> {
    pub fn new(
        backend: Arc<B>,
        clock: Arc<dyn Clock>,
        calendar: WorkCalendar,
        live_clock: LiveSessionClock,
        poll_interval: Duration,
    ) -> Self {
        let poll_interval = if poll_interval.is_zero() {
            warn!(default_secs = DEFAULT_POLL_INTERVAL.as_secs(), "zero poll interval");
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
        Self {
            backend,
            clock,
            calendar,
            live_clock,
            poll_interval,
            issued_seq: AtomicU64::new(0),
            snapshot: RwLock::new(Snapshot::default()),
            poller: Mutex::new(None),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, StoreError> {
        let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = match self.backend.list_time_entries().await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, seq, "refresh failed, keeping the previous snapshot");
                return Err(StoreError::Fetch(error));
            }
        };

        let outcome = {
            let mut snapshot = self.snapshot.write().await;
            if seq < snapshot.applied_seq {
                debug!(seq, applied = snapshot.applied_seq, "dropping stale refresh");
                return Ok(RefreshOutcome::Stale);
            }
            snapshot.applied_seq = seq;
            snapshot.loaded = true;

            let outcome = if snapshot.entries[..] == fetched[..] {
                RefreshOutcome::Unchanged
            } else {
                snapshot.entries = fetched.into();
                RefreshOutcome::Updated
            };
            let view = TimesheetView::new(snapshot.entries.clone(), self.clock.now(), self.calendar);
            snapshot.dashboard = Some(view.dashboard());
            outcome
        };

        self.sync_clock().await;
        debug!(seq, ?outcome, "refresh applied");
        Ok(outcome)
    }

    /// Inserts or replaces `entry` ahead of the next poll. Refreshes already in flight are
    /// treated as stale.
    pub async fn merge_entry(&self, entry: TimeEntry) {
        {
            let mut snapshot = self.snapshot.write().await;
            let mut entries = snapshot.entries.to_vec();
            match entries.iter_mut().find(|existing| existing.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.insert(0, entry),
            }
            snapshot.entries = entries.into();
            snapshot.applied_seq = self.issued_seq.load(Ordering::SeqCst) + 1;
            let view = TimesheetView::new(snapshot.entries.clone(), self.clock.now(), self.calendar);
            snapshot.dashboard = Some(view.dashboard());
        }
        self.sync_clock().await;
    }

    /// Drops all local data and stops the timers. Refreshes in flight are discarded.
    pub async fn clear(&self) {
        self.stop().await;
        *self.snapshot.write().await = Snapshot {
            applied_seq: self.issued_seq.load(Ordering::SeqCst) + 1,
            ..Snapshot::default()
        };
        info!("time tracking store cleared");
    }

    async fn sync_clock(&self) -> ClockState {
        let entries = self.snapshot.read().await.entries.clone();
        self.live_clock.sync(&entries).await
    }

    /// Starts polling, beginning with an immediate refresh. A no-op when already polling.
    pub async fn start(self: &Arc<Self>) {
        let mut poller = self.poller.lock().await;
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let store: Weak<Self> = Arc::downgrade(self);
        let period = self.poll_interval;
        *poller = Some(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                // Failures are already reported by refresh; the next poll retries.
                let _ = store.refresh().await;
            }
        }));
        info!(interval_secs = period.as_secs(), "polling started");
    }

    /// Stops polling and the live clock.
    pub async fn stop(&self) {
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
            info!("polling stopped");
        }
        self.live_clock.stop().await;
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// False until the first successful refresh.
    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.loaded
    }

    /// A view over the current entries, bound to one fresh "now".
    pub async fn snapshot(&self) -> TimesheetView {
        let entries = self.snapshot.read().await.entries.clone();
        TimesheetView::new(entries, self.clock.now(), self.calendar)
            .with_tick(self.live_clock.ticks())
    }

    /// Dashboard summary computed by the last refresh or merge.
    pub async fn dashboard(&self) -> Option<DashboardStats> {
        self.snapshot.read().await.dashboard.clone()
    }

    pub fn live_clock(&self) -> &LiveSessionClock {
        &self.live_clock
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub async fn weekly_hours(&self, week_offset: i32) -> f64 {
        self.snapshot().await.weekly_hours(week_offset)
    }

    pub async fn hours_for_day(&self, date: NaiveDate) -> String {
        self.snapshot().await.hours_for_day(date)
    }

    pub async fn stats_for_week(&self, week_offset: i32, target_hours: f64) -> WeeklyStats {
        self.snapshot().await.stats_for_week(week_offset, target_hours)
    }
}

impl<B: TimeTrackingBackend + 'static> Drop for TimeTrackingStore<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.get_mut().take() {
            handle.abort();
        }
    }
}
