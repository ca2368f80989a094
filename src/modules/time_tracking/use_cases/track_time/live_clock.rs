// Live Session Clock.
//
// Purpose
// - Emit a tick once per interval while the viewer has an open session, so that views holding
//   derived hours know to recompute against a fresh "now".
//
// Responsibilities
// - Two states: Idle and Ticking. At most one ticker task exists at any time.
// - The tick counter is reset to zero on every transition.
//
// Testing guidance
// - Run under a paused tokio clock and drive it with `tokio::time::advance`.

use crate::modules::time_tracking::core::time_entry::TimeEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Ticking,
}

pub struct LiveSessionClock {
    interval: Duration,
    ticks: Arc<watch::Sender<u64>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for LiveSessionClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl LiveSessionClock {
    /// A zero interval falls back to the default.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(default_ms = DEFAULT_TICK_INTERVAL.as_millis() as u64, "zero tick interval");
            DEFAULT_TICK_INTERVAL
        } else {
            interval
        };
        let (ticks, _) = watch::channel(0);
        Self {
            interval,
            ticks: Arc::new(ticks),
            ticker: Mutex::new(None),
        }
    }

    /// Idle to Ticking. Returns false, and leaves the running ticker alone, when already ticking.
    pub async fn start(&self) -> bool {
        let mut ticker = self.ticker.lock().await;
        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        self.ticks.send_replace(0);
        let ticks = self.ticks.clone();
        let period = self.interval;
        let first_tick = time::Instant::now() + period;
        *ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                ticks.send_modify(|count| *count += 1);
            }
        }));
        debug!(interval_ms = period.as_millis() as u64, "live session clock started");
        true
    }

    /// Ticking to Idle. A no-op when idle.
    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
            debug!("live session clock stopped");
        }
        self.ticks.send_replace(0);
    }

    /// Ticks while `entries` hold an open session, idles otherwise.
    pub async fn sync(&self, entries: &[TimeEntry]) -> ClockState {
        if entries.iter().any(TimeEntry::is_open) {
            self.start().await;
            ClockState::Ticking
        } else {
            self.stop().await;
            ClockState::Idle
        }
    }

    pub async fn state(&self) -> ClockState {
        match self.ticker.lock().await.as_ref() {
            Some(handle) if !handle.is_finished() => ClockState::Ticking,
            _ => ClockState::Idle,
        }
    }

    pub fn ticks(&self) -> u64 {
        *self.ticks.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ticks.subscribe()
    }
}

impl Drop for LiveSessionClock {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}
