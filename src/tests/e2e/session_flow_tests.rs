use crate::modules::time_tracking::core::roles::Role;
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::modules::time_tracking::use_cases::track_time::live_clock::ClockState;
use crate::shared::core::clock::{Clock, ManualClock};
use crate::shared::infrastructure::backend::TimeTrackingBackend;
use crate::shared::infrastructure::backend::in_memory::InMemoryBackend;
use crate::shell::config::{AppType, Config};
use crate::shell::kiosk::EndReason;
use crate::shell::state::AppState;
use crate::tests::fixtures::entries::{TimeEntryBuilder, at};
use crate::tests::fixtures::users::profile;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

async fn signed_in_state(
    entries: Vec<TimeEntry>,
) -> (Arc<ManualClock>, Arc<InMemoryBackend>, AppState<InMemoryBackend>) {
    let clock = Arc::new(ManualClock::new(at(2024, 3, 6, 9, 0)));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    backend
        .register_user("123456", profile("1", Role::Member, 40.0))
        .await;
    backend.seed_entries("1", entries).await;
    let config = Config {
        app_type: AppType::Clock,
        ..Config::default()
    };
    let state = AppState::new(config, backend.clone(), clock.clone());
    state.sign_in(Some("123456")).await.unwrap();
    (clock, backend, state)
}

#[tokio::test(start_paused = true)]
async fn polling_picks_up_a_session_opened_elsewhere() {
    let (clock, backend, state) = signed_in_state(vec![]).await;
    state.store.start().await;
    time::sleep(Duration::from_millis(1)).await;
    assert!(state.store.is_loaded().await);
    assert_eq!(state.store.live_clock().state().await, ClockState::Idle);

    // Clocked in on another terminal.
    backend
        .seed_entries("1", vec![TimeEntryBuilder::open(clock.now()).build()])
        .await;
    time::sleep(state.config.poll_interval).await;
    assert_eq!(state.store.live_clock().state().await, ClockState::Ticking);

    let mut ticks = state.store.live_clock().subscribe();
    let mut previous = state.store.snapshot().await.open_session_seconds();
    for _ in 0..3 {
        ticks.changed().await.unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let view = state.store.snapshot().await;
        assert!(view.tick() >= 1);
        assert!(view.open_session_seconds() > previous);
        previous = view.open_session_seconds();
    }

    state.store.stop().await;
    assert!(!state.store.is_polling().await);
    assert_eq!(state.store.live_clock().state().await, ClockState::Idle);
}

#[tokio::test(start_paused = true)]
async fn an_idle_kiosk_signs_out_and_forgets() {
    let (clock, backend, state) =
        signed_in_state(vec![TimeEntryBuilder::open(at(2024, 3, 6, 8, 0)).build()]).await;
    let kiosk = state.kiosk_session();
    kiosk.record_activity();
    state.store.start().await;
    time::sleep(Duration::from_millis(1)).await;
    assert!(state.store.is_loaded().await);

    assert_eq!(kiosk.idle_guard().await, EndReason::IdleTimeout);
    assert!(!state.store.is_polling().await);
    assert!(!state.store.is_loaded().await);
    assert_eq!(backend.current_user().await.unwrap(), None);

    // A fresh sign-in starts from a clean slate.
    clock.advance(chrono::Duration::minutes(5));
    kiosk.record_activity();
    state.sign_in(Some("123456")).await.unwrap();
    state.store.refresh().await.unwrap();
    assert_eq!(state.store.snapshot().await.entries().len(), 1);
}
