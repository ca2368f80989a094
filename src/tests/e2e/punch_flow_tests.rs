use crate::modules::time_tracking::core::analytics::Trend;
use crate::modules::time_tracking::core::roles::Role;
use crate::modules::time_tracking::use_cases::track_time::live_clock::ClockState;
use crate::shared::core::clock::{Clock, ManualClock};
use crate::shared::infrastructure::backend::TimeTrackingBackend;
use crate::shared::infrastructure::backend::in_memory::InMemoryBackend;
use crate::shell::config::Config;
use crate::shell::state::AppState;
use crate::tests::fixtures::entries::{TimeEntryBuilder, at};
use crate::tests::fixtures::users::profile;
use chrono::{Duration, Weekday};
use std::sync::Arc;

fn monday_config() -> Config {
    Config {
        week_start: Weekday::Mon,
        ..Config::default()
    }
}

#[tokio::test]
async fn a_working_day_is_reflected_in_every_view() {
    // Wednesday 6 March 2024, 09:00 UTC.
    let clock = Arc::new(ManualClock::new(at(2024, 3, 6, 9, 0)));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    backend
        .register_user("123456", profile("1", Role::Member, 40.0))
        .await;
    backend
        .seed_entries(
            "1",
            vec![
                TimeEntryBuilder::closed(at(2024, 3, 5, 9, 0), at(2024, 3, 5, 17, 0)).build(),
                TimeEntryBuilder::closed(at(2024, 3, 4, 9, 0), at(2024, 3, 4, 17, 0)).build(),
            ],
        )
        .await;
    let state = AppState::new(monday_config(), backend.clone(), clock.clone());
    let user = state.sign_in(Some("123456")).await.unwrap();

    let status = state.punch.load_status().await.unwrap();
    assert!(!status.is_clocked_in);
    assert_eq!(state.store.weekly_hours(0).await, 16.0);

    state.punch.clock_in().await.unwrap();
    assert_eq!(state.store.live_clock().state().await, ClockState::Ticking);

    clock.advance(Duration::minutes(90));
    let view = state.store.snapshot().await;
    assert_eq!(view.hours_today(), "1h 30m 0s");
    assert_eq!(view.weekly_hours(0), 17.5);

    // The next poll agrees with the optimistic merge.
    state.store.refresh().await.unwrap();
    assert_eq!(state.store.weekly_hours(0).await, 17.5);

    clock.advance(Duration::minutes(390));
    let closed = state.punch.clock_out().await.unwrap();
    assert_eq!(closed.duration, Some(8 * 3600));
    assert_eq!(state.store.live_clock().state().await, ClockState::Idle);

    let view = state.store.snapshot().await;
    let stats = view.stats_for_week(0, user.target_hours_per_week);
    assert_eq!(stats.total_hours, 24.0);
    assert_eq!(stats.days_worked, 3);
    assert_eq!(stats.average_daily, 8.0);
    assert_eq!(stats.progress, 60);
    assert_eq!(stats.trend, Trend::Up);

    let dashboard = state.store.dashboard().await.unwrap();
    assert_eq!(dashboard.total_hours, stats.total_hours);
    assert_eq!(dashboard.current_streak, 3);
    assert_eq!(dashboard.recent_activity[0], closed);
}

#[tokio::test]
async fn a_failed_punch_can_be_retried() {
    let clock = Arc::new(ManualClock::new(at(2024, 3, 6, 9, 0)));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    backend
        .register_user("123456", profile("1", Role::Member, 40.0))
        .await;
    let state = AppState::new(monday_config(), backend.clone(), clock.clone());
    state.sign_in(Some("123456")).await.unwrap();
    state.punch.load_status().await.unwrap();

    backend.toggle_offline();
    assert!(state.punch.clock_in().await.is_err());
    assert!(state.store.snapshot().await.entries().is_empty());

    backend.toggle_offline();
    let entry = state.punch.clock_in().await.unwrap();
    assert_eq!(entry.clock_in, clock.now());
    assert_eq!(backend.entries_of("1").await, vec![entry]);
}

#[tokio::test]
async fn a_chair_reads_a_member_timesheet_through_the_same_figures() {
    let clock = Arc::new(ManualClock::new(at(2024, 3, 6, 12, 0)));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    backend
        .register_user("111111", profile("1", Role::Member, 40.0))
        .await;
    backend
        .register_user("222222", profile("2", Role::Chair, 40.0))
        .await;
    let entries = vec![
        TimeEntryBuilder::open(at(2024, 3, 6, 11, 0)).build(),
        TimeEntryBuilder::closed(at(2024, 3, 3, 22, 0), at(2024, 3, 4, 2, 0)).build(),
    ];
    backend.seed_entries("1", entries).await;

    // The member's own view.
    let own = AppState::new(monday_config(), backend.clone(), clock.clone());
    own.sign_in(Some("111111")).await.unwrap();
    own.store.refresh().await.unwrap();
    let own_view = own.store.snapshot().await;

    // The chair's view of the member.
    backend.logout().await.unwrap();
    let chair_state = AppState::new(monday_config(), backend.clone(), clock.clone());
    let chair = chair_state.sign_in(Some("222222")).await.unwrap();
    let member_view = chair_state.member_timesheet.handle(&chair, "1").await.unwrap();

    assert_eq!(member_view.weekly_hours(0), own_view.weekly_hours(0));
    assert_eq!(member_view.weekly_hours(0), 3.0);
    assert_eq!(member_view.weekly_hours(-1), 2.0);
    assert_eq!(
        member_view.stats_for_week(0, 40.0),
        own_view.stats_for_week(0, 40.0)
    );
}
