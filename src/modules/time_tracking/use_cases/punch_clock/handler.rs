// Punch control: clock-in and clock-out.
//
// Purpose
// - Send punch commands to the backend and reflect the result locally right away.
//
// Responsibilities
// - Serialize actions: while one request is in flight, further requests are refused.
// - Reject clock-in while clocked in and clock-out while not clocked in, judged from the store's
//   latest snapshot so a poll that saw a punch from another terminal is honoured.
// - Merge the returned entry into the store so views update before the next poll.
//
// Boundaries
// - On failure nothing local is touched; the error goes back to the caller.

use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::modules::time_tracking::use_cases::track_time::store::{StoreError, TimeTrackingStore};
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PunchError {
    #[error("another punch request is in flight")]
    Busy,

    #[error("already clocked in")]
    AlreadyClockedIn,

    #[error("not clocked in")]
    NotClockedIn,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<StoreError> for PunchError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Fetch(inner) => PunchError::Backend(inner),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockStatus {
    pub is_clocked_in: bool,
    pub current_session: Option<TimeEntry>,
    pub last_activity: Option<TimeEntry>,
}

impl ClockStatus {
    /// Derives the status from entries in backend order, newest first.
    pub fn from_entries(entries: &[TimeEntry]) -> Self {
        let current_session = entries.iter().find(|entry| entry.is_open()).cloned();
        Self {
            is_clocked_in: current_session.is_some(),
            current_session,
            last_activity: entries.first().cloned(),
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct PunchClock<B: TimeTrackingBackend + 'static> {
    backend: Arc<B>,
    store: Arc<TimeTrackingStore<B>>,
    in_flight: AtomicBool,
}

impl<B: TimeTrackingBackend + 'static> PunchClock<B> {
    pub fn new(backend: Arc<B>, store: Arc<TimeTrackingStore<B>>) -> Self {
        Self {
            backend,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, PunchError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| PunchError::Busy)
    }

    /// True while a request is in flight; the control should be disabled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Status as of the store's latest snapshot, whether it came from a poll or a punch.
    pub async fn status(&self) -> ClockStatus {
        ClockStatus::from_entries(self.store.snapshot().await.entries())
    }

    /// Refreshes the store and derives the status from its entries.
    pub async fn load_status(&self) -> Result<ClockStatus, PunchError> {
        let _guard = self.begin()?;
        self.store.refresh().await?;
        Ok(self.status().await)
    }

    pub async fn clock_in(&self) -> Result<TimeEntry, PunchError> {
        let _guard = self.begin()?;
        if self.status().await.is_clocked_in {
            return Err(PunchError::AlreadyClockedIn);
        }

        let entry = self.backend.clock_in().await.inspect_err(|error| {
            warn!(%error, "clock-in failed");
        })?;
        info!(entry_id = %entry.id, clock_in = %entry.clock_in, "clocked in");

        self.store.merge_entry(entry.clone()).await;
        Ok(entry)
    }

    pub async fn clock_out(&self) -> Result<TimeEntry, PunchError> {
        let _guard = self.begin()?;
        if !self.status().await.is_clocked_in {
            return Err(PunchError::NotClockedIn);
        }

        let entry = self.backend.clock_out().await.inspect_err(|error| {
            warn!(%error, "clock-out failed");
        })?;
        info!(entry_id = %entry.id, duration = ?entry.duration, "clocked out");

        self.store.merge_entry(entry.clone()).await;
        Ok(entry)
    }
}
