//! The async tick driver against the real system clock.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use zentimer_core::events::Event;
use zentimer_core::storage::{save_snapshot, PersistedSnapshot};
use zentimer_core::timer::{drive, CompletionTrigger};
use zentimer_core::{MemoryStore, TimerController, TimerState};

#[tokio::test]
async fn drive_returns_the_completion_event() {
    let store = MemoryStore::new();
    let now = Utc::now();
    save_snapshot(
        &store,
        &PersistedSnapshot {
            deadline: now + Duration::milliseconds(1_200),
            duration_secs: 60,
            started_at: now - Duration::milliseconds(58_800),
        },
    )
    .unwrap();

    let (mut controller, _) = TimerController::builder().store(store).launch();
    assert_eq!(controller.state(), TimerState::Running);

    let event = tokio::time::timeout(
        StdDuration::from_secs(10),
        drive(
            &mut controller,
            StdDuration::from_millis(50),
            std::future::pending::<()>(),
        ),
    )
    .await
    .expect("driver should finish before the timeout");

    assert!(matches!(
        event,
        Some(Event::TimerCompleted {
            trigger: CompletionTrigger::Tick,
            ..
        })
    ));
    assert_eq!(controller.state(), TimerState::Completed);
}

#[tokio::test]
async fn shutdown_stops_the_driver() {
    let (mut controller, _) = TimerController::builder()
        .store(MemoryStore::new())
        .launch();
    controller.start();

    let event = drive(
        &mut controller,
        StdDuration::from_millis(10),
        tokio::time::sleep(StdDuration::from_millis(50)),
    )
    .await;

    assert!(event.is_none());
    assert_eq!(controller.state(), TimerState::Running);
}

#[tokio::test]
async fn idle_controller_is_not_driven() {
    let (mut controller, _) = TimerController::builder()
        .store(MemoryStore::new())
        .launch();
    let event = drive(
        &mut controller,
        StdDuration::from_millis(10),
        std::future::pending::<()>(),
    )
    .await;
    assert!(event.is_none());
}
