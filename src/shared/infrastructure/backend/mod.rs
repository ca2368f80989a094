// Port to the time registration backend.
//
// Purpose
// - The only way the client reaches authentication, punch commands and the time log.
//
// Boundaries
// - The backend owns the data and enforces roles. Callers treat every response as untrusted
//   input and every failure as recoverable.

use crate::modules::time_tracking::core::roles::Role;
use crate::modules::time_tracking::core::time_entry::{TimeEntry, deserialize_id};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("not authenticated")]
    Unauthorized,

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("backend offline")]
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "id", deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub target_hours_per_week: f64,
}

#[async_trait]
pub trait TimeTrackingBackend: Send + Sync {
    async fn login(&self, access_code: &str) -> Result<UserProfile, BackendError>;
    async fn logout(&self) -> Result<(), BackendError>;
    /// `None` when there is no authenticated session.
    async fn current_user(&self) -> Result<Option<UserProfile>, BackendError>;
    async fn clock_in(&self) -> Result<TimeEntry, BackendError>;
    async fn clock_out(&self) -> Result<TimeEntry, BackendError>;
    /// Entries of the authenticated user, newest first.
    async fn list_time_entries(&self) -> Result<Vec<TimeEntry>, BackendError>;
    async fn member_timesheet(&self, user_id: &str) -> Result<Vec<TimeEntry>, BackendError>;
}

pub mod http;
pub mod in_memory;
