//! Completion reconciliation across tick, notification and foreground
//! signals, plus the notification bookkeeping around start/pause/reset.

mod common;

use chrono::{Duration, Utc};
use common::{launch, SchedulerCall};
use zentimer_core::events::Event;
use zentimer_core::notify::UserAction;
use zentimer_core::timer::CompletionTrigger;
use zentimer_core::{Clock, ManualClock, MemoryStore, TimerState};

#[test]
fn start_schedules_exactly_one_notification_for_the_deadline() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    let deadline = clock.now() + Duration::seconds(300);
    assert_eq!(process.scheduler.scheduled(), vec![deadline]);
    assert_eq!(process.scheduler.pending(), Some(deadline));
}

#[test]
fn pause_cancels_and_resume_reschedules() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    clock.advance(Duration::seconds(60));
    process.controller.pause();
    assert_eq!(process.scheduler.pending(), None);

    clock.advance(Duration::seconds(600));
    process.controller.start();
    let resumed_deadline = clock.now() + Duration::seconds(240);
    assert_eq!(process.scheduler.pending(), Some(resumed_deadline));
    assert_eq!(process.scheduler.scheduled().len(), 2);
}

#[test]
fn reset_cancels_pending_notification() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    process.controller.reset();
    assert_eq!(process.scheduler.pending(), None);
    assert_eq!(process.scheduler.calls().last(), Some(&SchedulerCall::Cancel));
}

#[test]
fn notification_after_tick_completion_does_not_replay_alert() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    let deadline = process.controller.session().deadline().unwrap();
    clock.advance(Duration::seconds(300));

    assert!(matches!(
        process.controller.tick(),
        Some(Event::TimerCompleted {
            trigger: CompletionTrigger::Tick,
            ..
        })
    ));
    assert!(process.controller.on_notification_delivered(deadline).is_none());
    assert!(process.controller.on_app_foregrounded().is_none());
    assert_eq!(process.alerts.count(), 1);
}

#[test]
fn notification_can_be_the_first_signal() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    let deadline = process.controller.session().deadline().unwrap();
    clock.advance(Duration::seconds(301));

    assert!(matches!(
        process.controller.on_notification_delivered(deadline),
        Some(Event::TimerCompleted {
            trigger: CompletionTrigger::Notification,
            ..
        })
    ));
    assert!(process.controller.tick().is_none());
    assert_eq!(process.alerts.count(), 1);
    assert_eq!(process.controller.state(), TimerState::Completed);
}

#[test]
fn notification_for_an_old_deadline_is_ignored() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    let first_deadline = process.controller.session().deadline().unwrap();
    process.controller.reset();
    process.controller.start();

    assert!(process
        .controller
        .on_notification_delivered(first_deadline)
        .is_none());
    assert_eq!(process.controller.state(), TimerState::Running);
    assert_eq!(process.alerts.count(), 0);
}

#[test]
fn foreground_completes_an_overdue_session() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    process.controller.on_app_backgrounded();
    clock.advance(Duration::seconds(30));
    assert!(process.controller.tick().is_none());

    clock.advance(Duration::minutes(10));
    let event = process.controller.on_app_foregrounded();
    assert!(matches!(
        event,
        Some(Event::TimerCompleted {
            trigger: CompletionTrigger::Foreground,
            alerted: true,
            ..
        })
    ));
    assert_eq!(process.alerts.count(), 1);
}

#[test]
fn background_completion_plays_no_alert() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    process.controller.on_app_backgrounded();
    clock.advance(Duration::seconds(300));

    assert!(matches!(
        process.controller.tick(),
        Some(Event::TimerCompleted { alerted: false, .. })
    ));
    assert_eq!(process.alerts.count(), 0);
    // The OS notification is the alert while in the background.
    assert!(process.scheduler.pending().is_some());

    assert!(process.controller.on_app_foregrounded().is_none());
    assert_eq!(process.alerts.count(), 0);
}

#[test]
fn alert_uses_current_preferences() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.toggle_sound();
    process.controller.toggle_quiet_mode();
    process.controller.start();
    clock.advance(Duration::seconds(300));
    process.controller.tick();

    let played = process.alerts.last().unwrap();
    assert!(played.sound_enabled);
    assert!(played.quiet_mode_enabled);
}

#[test]
fn stop_action_resets() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    clock.advance(Duration::seconds(300));
    process.controller.tick();

    let event = process
        .controller
        .handle_notification_action(UserAction::StopRequested);
    assert!(matches!(event, Some(Event::TimerReset { .. })));
    assert_eq!(process.controller.state(), TimerState::Idle);
    assert_eq!(process.controller.session().remaining_secs(), 300);
}

#[test]
fn restart_action_starts_a_fresh_session() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.set_duration(3);
    process.controller.start();
    clock.advance(Duration::seconds(180));
    process.controller.tick();

    let event = process
        .controller
        .handle_notification_action(UserAction::RestartRequested);
    assert!(matches!(
        event,
        Some(Event::TimerStarted {
            remaining_secs: 180,
            ..
        })
    ));
    assert_eq!(
        process.controller.session().deadline(),
        Some(clock.now() + Duration::seconds(180))
    );
}

#[test]
fn default_open_acts_like_foregrounding() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let mut process = launch(&store, &clock);

    process.controller.start();
    process.controller.on_app_backgrounded();
    clock.advance(Duration::seconds(20));
    process
        .controller
        .handle_notification_action(UserAction::DefaultOpen);

    assert_eq!(
        process.controller.lifecycle(),
        zentimer_core::timer::AppLifecycle::Foreground
    );
    assert_eq!(process.controller.session().remaining_secs(), 280);
}
