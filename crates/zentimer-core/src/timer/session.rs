//! The single live countdown session and its duration rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_MINUTES: u32 = 1;
/// Upper bound for the dial and for direct duration commands.
pub const DIAL_MAX_MINUTES: u32 = 60;
/// Upper bound for the +/- stepper. Wider than the dial on purpose.
pub const STEPPER_MAX_MINUTES: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

pub fn clamp_dial_minutes(minutes: i64) -> u32 {
    minutes.clamp(MIN_MINUTES as i64, DIAL_MAX_MINUTES as i64) as u32
}

pub fn clamp_stepper_minutes(minutes: i64) -> u32 {
    minutes.clamp(MIN_MINUTES as i64, STEPPER_MAX_MINUTES as i64) as u32
}

/// Quantize dial progress (0.0 ..= 1.0) to whole minutes.
pub fn minutes_from_progress(progress: f64) -> u32 {
    let progress = if progress.is_finite() { progress } else { 0.0 };
    let minutes = (progress * DIAL_MAX_MINUTES as f64).round();
    // Saturating float-to-int cast; the clamp then bounds it.
    clamp_dial_minutes(minutes as i64)
}

/// Countdown session state.
///
/// Every mutator keeps two invariants: `remaining_secs <= duration_secs`, and
/// `deadline` is set exactly when the state is `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    duration_secs: u32,
    remaining_secs: u32,
    state: TimerState,
    deadline: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
}

impl TimerSession {
    /// Idle session with `minutes` loaded (clamped to the stepper range).
    pub fn new(minutes: u32) -> Self {
        let duration_secs = clamp_stepper_minutes(minutes as i64) * 60;
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            deadline: None,
            started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn minutes(&self) -> u32 {
        self.duration_secs / 60
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_consistent(&self) -> bool {
        self.remaining_secs <= self.duration_secs
            && self.deadline.is_some() == (self.state == TimerState::Running)
            && self.duration_secs % 60 == 0
            && self.duration_secs >= MIN_MINUTES * 60
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub(crate) fn set_minutes(&mut self, minutes: u32) {
        self.duration_secs = minutes * 60;
        self.remaining_secs = self.duration_secs;
    }

    pub(crate) fn run_until(&mut self, deadline: DateTime<Utc>, started_at: DateTime<Utc>) {
        self.state = TimerState::Running;
        self.deadline = Some(deadline);
        self.started_at = Some(started_at);
    }

    /// Recompute the cached remaining value from the deadline.
    pub(crate) fn sync_remaining(&mut self, seconds_left: i64) {
        self.remaining_secs = seconds_left.clamp(0, self.duration_secs as i64) as u32;
    }

    pub(crate) fn freeze(&mut self, seconds_left: i64) {
        self.sync_remaining(seconds_left);
        self.state = TimerState::Paused;
        self.deadline = None;
    }

    pub(crate) fn complete(&mut self) {
        self.state = TimerState::Completed;
        self.remaining_secs = 0;
        self.deadline = None;
    }

    pub(crate) fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.duration_secs;
        self.deadline = None;
        self.started_at = None;
    }

    /// Rebuild a running session from a persisted snapshot.
    pub(crate) fn restore_running(
        &mut self,
        duration_secs: u32,
        deadline: DateTime<Utc>,
        started_at: DateTime<Utc>,
        seconds_left: i64,
    ) {
        self.duration_secs = duration_secs;
        self.run_until(deadline, started_at);
        self.sync_remaining(seconds_left);
    }

    /// Rebuild a paused session from a persisted record.
    pub(crate) fn restore_paused(&mut self, duration_secs: u32, remaining_secs: u32) {
        self.duration_secs = duration_secs;
        self.state = TimerState::Paused;
        self.deadline = None;
        self.started_at = None;
        self.remaining_secs = remaining_secs.min(duration_secs);
    }
}
