// Wiring of one client session.
//
// Purpose
// - Build the store, punch control and timesheet handler around a single backend and clock.

use crate::modules::time_tracking::use_cases::punch_clock::handler::PunchClock;
use crate::modules::time_tracking::use_cases::track_time::live_clock::LiveSessionClock;
use crate::modules::time_tracking::use_cases::track_time::store::TimeTrackingStore;
use crate::modules::time_tracking::use_cases::view_member_timesheet::handler::ViewMemberTimesheetHandler;
use crate::shared::core::clock::{Clock, SystemClock};
use crate::shared::infrastructure::backend::http::HttpBackend;
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend, UserProfile};
use crate::shell::config::Config;
use crate::shell::kiosk::KioskSession;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("no active session and no access code given")]
    MissingAccessCode,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct AppState<B: TimeTrackingBackend + 'static> {
    pub config: Config,
    pub backend: Arc<B>,
    pub clock: Arc<dyn Clock>,
    pub store: Arc<TimeTrackingStore<B>>,
    pub punch: Arc<PunchClock<B>>,
    pub member_timesheet: Arc<ViewMemberTimesheetHandler<B>>,
}

impl AppState<HttpBackend> {
    pub fn from_config(config: Config) -> Result<Self, BackendError> {
        let backend = HttpBackend::builder(config.api_base_url.clone())
            .app_type(config.app_type.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::new(config, Arc::new(backend), Arc::new(SystemClock)))
    }
}

impl<B: TimeTrackingBackend + 'static> AppState<B> {
    pub fn new(config: Config, backend: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        let calendar = config.calendar();
        let store = Arc::new(TimeTrackingStore::new(
            backend.clone(),
            clock.clone(),
            calendar,
            LiveSessionClock::new(config.tick_interval),
            config.poll_interval,
        ));
        let punch = Arc::new(PunchClock::new(backend.clone(), store.clone()));
        let member_timesheet = Arc::new(ViewMemberTimesheetHandler::new(
            backend.clone(),
            clock.clone(),
            calendar,
        ));
        Self {
            config,
            backend,
            clock,
            store,
            punch,
            member_timesheet,
        }
    }

    pub fn kiosk_session(&self) -> KioskSession<B> {
        KioskSession::new(
            self.backend.clone(),
            self.store.clone(),
            self.config.kiosk_idle_timeout,
        )
    }

    /// Reuses a live session when the backend still has one, otherwise logs in.
    pub async fn sign_in(&self, access_code: Option<&str>) -> Result<UserProfile, SignInError> {
        if let Some(user) = self.backend.current_user().await? {
            return Ok(user);
        }
        let code = access_code.ok_or(SignInError::MissingAccessCode)?;
        let user = self.backend.login(code).await?;
        info!(user_id = %user.user_id, role = %user.role, "signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod app_state_tests {
    use super::*;
    use crate::modules::time_tracking::core::roles::Role;
    use crate::shared::core::clock::ManualClock;
    use crate::shared::infrastructure::backend::in_memory::InMemoryBackend;
    use crate::tests::fixtures::entries::at;
    use crate::tests::fixtures::users::profile;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState<InMemoryBackend> {
        let clock = Arc::new(ManualClock::new(at(2024, 3, 6, 9, 0)));
        let backend = Arc::new(InMemoryBackend::new(clock.clone()));
        AppState::new(Config::default(), backend, clock)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_sign_in_with_the_access_code(state: AppState<InMemoryBackend>) {
        state
            .backend
            .register_user("123456", profile("1", Role::Chair, 32.0))
            .await;
        let user = state.sign_in(Some("123456")).await.unwrap();
        assert_eq!(user.role, Role::Chair);
        // The session is reused without a code.
        assert_eq!(state.sign_in(None).await.unwrap(), user);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_require_a_code_without_a_session(state: AppState<InMemoryBackend>) {
        assert!(matches!(
            state.sign_in(None).await,
            Err(SignInError::MissingAccessCode)
        ));
        assert!(matches!(
            state.sign_in(Some("000000")).await,
            Err(SignInError::Backend(BackendError::Unauthorized))
        ));
    }

    #[rstest]
    fn it_should_build_the_http_state_from_config() {
        let state = AppState::from_config(Config::default()).unwrap();
        assert_eq!(state.backend.base_url(), "http://localhost:8000/api");
    }
}
