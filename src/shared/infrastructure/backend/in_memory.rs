// In memory implementation of the TimeTrackingBackend port.
//
// Purpose
// - Drive the store, punch and timesheet use cases in tests and local runs without a server.
//
// Responsibilities
// - Keep users by access code and entries per user, newest first.
// - Mirror the server rules: one open session per user, duration stamped on clock-out, member
//   timesheets restricted to chairs, admins and the member themselves.
//
// Testing guidance
// - `toggle_offline` makes every call fail with `BackendError::Offline`.
// - `set_delay_ms` is read when a call starts, so racing calls can finish out of order.

use crate::modules::time_tracking::core::roles::Permission;
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::core::clock::Clock;
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend, UserProfile};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    users: HashMap<String, UserProfile>,
    entries: HashMap<String, Vec<TimeEntry>>,
    session: Option<String>,
}

pub struct InMemoryBackend {
    clock: Arc<dyn Clock>,
    state: RwLock<State>,
    next_id: AtomicU64,
    is_offline: AtomicBool,
    delay_ms: AtomicU64,
    list_calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: RwLock::new(State::default()),
            next_id: AtomicU64::new(1),
            is_offline: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub async fn register_user(&self, access_code: impl Into<String>, profile: UserProfile) {
        self.state
            .write()
            .await
            .users
            .insert(access_code.into(), profile);
    }

    /// Replaces the stored entries of `user_id`. Expected newest first.
    pub async fn seed_entries(&self, user_id: &str, entries: Vec<TimeEntry>) {
        self.state
            .write()
            .await
            .entries
            .insert(user_id.to_string(), entries);
    }

    /// Authenticates without an access code.
    pub async fn sign_in_as(&self, user_id: &str) {
        self.state.write().await.session = Some(user_id.to_string());
    }

    pub async fn entries_of(&self, user_id: &str) -> Vec<TimeEntry> {
        self.state
            .read()
            .await
            .entries
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), BackendError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(BackendError::Offline);
        }
        Ok(())
    }

    fn session_user(state: &State) -> Result<&UserProfile, BackendError> {
        let user_id = state.session.as_deref().ok_or(BackendError::Unauthorized)?;
        state
            .users
            .values()
            .find(|user| user.user_id == user_id)
            .ok_or(BackendError::Unauthorized)
    }

    fn session_id(state: &State) -> Result<String, BackendError> {
        state.session.clone().ok_or(BackendError::Unauthorized)
    }
}

fn bad_request(message: &str) -> BackendError {
    BackendError::Status {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl TimeTrackingBackend for InMemoryBackend {
    async fn login(&self, access_code: &str) -> Result<UserProfile, BackendError> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let profile = state
            .users
            .get(access_code)
            .cloned()
            .ok_or(BackendError::Unauthorized)?;
        state.session = Some(profile.user_id.clone());
        Ok(profile)
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.enter().await?;
        self.state.write().await.session = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserProfile>, BackendError> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(Self::session_user(&state).ok().cloned())
    }

    async fn clock_in(&self) -> Result<TimeEntry, BackendError> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let user_id = Self::session_id(&state)?;
        let entries = state.entries.entry(user_id).or_default();
        if entries.iter().any(TimeEntry::is_open) {
            return Err(bad_request("Already clocked in"));
        }
        let entry = TimeEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            clock_in: self.clock.now(),
            clock_out: None,
            duration: None,
            is_active: true,
        };
        entries.insert(0, entry.clone());
        Ok(entry)
    }

    async fn clock_out(&self) -> Result<TimeEntry, BackendError> {
        self.enter().await?;
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let user_id = Self::session_id(&state)?;
        let open = state
            .entries
            .get_mut(&user_id)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.is_open()))
            .ok_or_else(|| bad_request("Not clocked in"))?;
        open.clock_out = Some(now);
        open.duration = Some((now - open.clock_in).num_seconds().max(0));
        open.is_active = false;
        Ok(open.clone())
    }

    async fn list_time_entries(&self) -> Result<Vec<TimeEntry>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let state = self.state.read().await;
        let user_id = Self::session_id(&state)?;
        Ok(state.entries.get(&user_id).cloned().unwrap_or_default())
    }

    async fn member_timesheet(&self, user_id: &str) -> Result<Vec<TimeEntry>, BackendError> {
        self.enter().await?;
        let state = self.state.read().await;
        let caller = Self::session_user(&state)?;
        if caller.user_id != user_id && !caller.role.can(Permission::ViewMemberTimesheet) {
            return Err(BackendError::Status {
                status: 403,
                message: "Insufficient permissions".into(),
            });
        }
        if !state.users.values().any(|user| user.user_id == user_id) {
            return Err(BackendError::Status {
                status: 404,
                message: "Member not found".into(),
            });
        }
        Ok(state.entries.get(user_id).cloned().unwrap_or_default())
    }
}
