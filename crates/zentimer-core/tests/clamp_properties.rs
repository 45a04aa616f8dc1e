//! Property tests for duration clamping and deadline arithmetic.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use zentimer_core::{ManualClock, MemoryStore, TimerController, TimerState};

fn controller(clock: &ManualClock) -> TimerController {
    let (controller, _) = TimerController::builder()
        .store(MemoryStore::new())
        .clock(clock.clone())
        .launch();
    controller
}

proptest! {
    #[test]
    fn direct_duration_stays_on_the_dial(minutes in any::<i64>()) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        controller.set_duration(minutes);
        let session = controller.session();
        prop_assert!((1..=60).contains(&session.minutes()));
        prop_assert_eq!(session.remaining_secs(), session.duration_secs());
        prop_assert!(session.is_consistent());
    }

    #[test]
    fn dial_progress_stays_on_the_dial(progress in any::<f64>()) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        controller.set_duration_from_angle(progress);
        prop_assert!((1..=60).contains(&controller.session().minutes()));
    }

    #[test]
    fn stepper_stays_within_its_range(deltas in proptest::collection::vec(-150i64..150, 1..20)) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        for delta in deltas {
            controller.adjust_duration(delta);
            prop_assert!((1..=99).contains(&controller.session().minutes()));
        }
    }

    #[test]
    fn remaining_tracks_the_deadline(minutes in 1i64..=60, elapsed_ms in 0i64..4_000_000) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        controller.set_duration(minutes);
        controller.start();
        let duration_ms = minutes * 60_000;

        clock.advance(Duration::milliseconds(elapsed_ms));
        controller.tick();

        let session = controller.session();
        prop_assert!(session.is_consistent());
        if elapsed_ms >= duration_ms {
            prop_assert_eq!(session.state(), TimerState::Completed);
            prop_assert_eq!(session.remaining_secs(), 0);
        } else {
            let left_ms = duration_ms - elapsed_ms;
            prop_assert_eq!(session.state(), TimerState::Running);
            prop_assert_eq!(session.remaining_secs() as i64, (left_ms + 999) / 1000);
        }
    }

    #[test]
    fn pausing_preserves_remaining_time(
        first_run_ms in 1i64..200_000,
        pause_ms in 0i64..10_000_000,
    ) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        controller.set_duration(5);
        controller.start();
        clock.advance(Duration::milliseconds(first_run_ms));
        controller.pause();
        let frozen = controller.session().remaining_secs();

        clock.advance(Duration::milliseconds(pause_ms));
        prop_assert_eq!(controller.session().remaining_secs(), frozen);
        controller.start();
        prop_assert_eq!(controller.session().remaining_secs(), frozen);
        prop_assert!(controller.session().is_consistent());
    }

    #[test]
    fn pausing_twice_is_the_same_as_once(
        run_ms in 1i64..299_000,
        gap_ms in 0i64..10_000_000,
    ) {
        let clock = ManualClock::new(Utc::now());
        let mut controller = controller(&clock);
        controller.start();
        clock.advance(Duration::milliseconds(run_ms));
        prop_assert!(controller.pause().is_some());
        let once = controller.published();

        clock.advance(Duration::milliseconds(gap_ms));
        prop_assert!(controller.pause().is_none());
        prop_assert_eq!(controller.published(), once);
    }
}
