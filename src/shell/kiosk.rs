// Kiosk session guard.
//
// Purpose
// - Enforce the kiosk's hard session lifetime: after a period without input, or when the page is
//   hidden or unloaded, sign out and drop every piece of local state.
//
// Responsibilities
// - Signal logout to the backend. Failures are logged and otherwise ignored.
// - Stop the store timers and clear its snapshot.
// - End a session at most once; new input activity re-arms the guard.
//
// Testing guidance
// - Uses tokio's clock, so idle timeouts can be driven with a paused runtime.

use crate::modules::time_tracking::use_cases::track_time::store::TimeTrackingStore;
use crate::shared::infrastructure::backend::TimeTrackingBackend;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{info, warn};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    IdleTimeout,
    Hidden,
    Unload,
}

struct Activity {
    last_input: Instant,
    ended: Option<EndReason>,
}

pub struct KioskSession<B: TimeTrackingBackend + 'static> {
    backend: Arc<B>,
    store: Arc<TimeTrackingStore<B>>,
    idle_timeout: Duration,
    activity: Mutex<Activity>,
}

impl<B: TimeTrackingBackend + 'static> KioskSession<B> {
    pub fn new(backend: Arc<B>, store: Arc<TimeTrackingStore<B>>, idle_timeout: Duration) -> Self {
        Self {
            backend,
            store,
            idle_timeout,
            activity: Mutex::new(Activity {
                last_input: Instant::now(),
                ended: None,
            }),
        }
    }

    fn activity(&self) -> MutexGuard<'_, Activity> {
        match self.activity.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Any input: pushes the idle deadline back and re-arms an ended session.
    pub fn record_activity(&self) {
        let mut activity = self.activity();
        activity.last_input = Instant::now();
        activity.ended = None;
    }

    pub fn ended(&self) -> Option<EndReason> {
        self.activity().ended
    }

    pub fn idle_deadline(&self) -> Instant {
        self.activity().last_input + self.idle_timeout
    }

    pub fn is_idle(&self) -> bool {
        Instant::now() >= self.idle_deadline()
    }

    /// Ends the session. Returns false when it had already ended.
    pub async fn end(&self, reason: EndReason) -> bool {
        {
            let mut activity = self.activity();
            if activity.ended.is_some() {
                return false;
            }
            activity.ended = Some(reason);
        }

        info!(?reason, "ending kiosk session");
        if let Err(error) = self.backend.logout().await {
            warn!(%error, "logout signal failed");
        }
        self.store.clear().await;
        true
    }

    pub async fn on_visibility_change(&self, visible: bool) -> bool {
        if visible {
            return false;
        }
        self.end(EndReason::Hidden).await
    }

    pub async fn on_unload(&self) -> bool {
        self.end(EndReason::Unload).await
    }

    /// Waits until the session ends, ending it on idle timeout.
    pub async fn idle_guard(&self) -> EndReason {
        loop {
            if let Some(reason) = self.ended() {
                return reason;
            }
            time::sleep_until(self.idle_deadline()).await;
            if self.is_idle() {
                self.end(EndReason::IdleTimeout).await;
            }
        }
    }
}
