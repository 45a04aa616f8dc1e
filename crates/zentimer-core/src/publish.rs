//! Read-only projection of controller state for UI and widget consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::alerts::AlertPreferences;
use crate::timer::{TimerSession, TimerState, DIAL_MAX_MINUTES};

/// Dial interaction state, kept beside the quantized minute value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub drag_progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedState {
    pub remaining_seconds: u32,
    pub duration_seconds: u32,
    pub state: TimerState,
    pub haptic_enabled: bool,
    pub flash_enabled: bool,
    pub sound_enabled: bool,
    pub quiet_mode_enabled: bool,
    pub ends_at: Option<DateTime<Utc>>,
    pub formatted_time: String,
    pub progress: f64,
    pub set_time_progress: f64,
    pub status_text: String,
    pub is_dragging: bool,
    pub advisory: Option<String>,
}

impl PublishedState {
    pub fn project(
        session: &TimerSession,
        prefs: &AlertPreferences,
        drag: &DragState,
        advisory: Option<&str>,
    ) -> Self {
        let set_time_progress = match (drag.is_dragging, drag.drag_progress) {
            (true, Some(progress)) => progress,
            _ => session.minutes() as f64 / DIAL_MAX_MINUTES as f64,
        };

        Self {
            remaining_seconds: session.remaining_secs(),
            duration_seconds: session.duration_secs(),
            state: session.state(),
            haptic_enabled: prefs.haptic_enabled,
            flash_enabled: prefs.flash_enabled,
            sound_enabled: prefs.sound_enabled,
            quiet_mode_enabled: prefs.quiet_mode_enabled,
            ends_at: session.deadline(),
            formatted_time: format_clock(session.remaining_secs()),
            progress: progress(session.remaining_secs(), session.duration_secs()),
            set_time_progress,
            status_text: status_text(session.state()).to_string(),
            is_dragging: drag.is_dragging,
            advisory: advisory.map(str::to_string),
        }
    }

    pub fn live_activity(&self) -> LiveActivityState {
        LiveActivityState {
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.duration_seconds,
            is_running: self.state == TimerState::Running,
            ends_at: self.ends_at,
        }
    }
}

/// The lock-screen widget's reduced view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveActivityState {
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub is_running: bool,
    pub ends_at: Option<DateTime<Utc>>,
}

/// "MM:SS", with minutes allowed past 59.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn progress(remaining_secs: u32, duration_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 1.0;
    }
    remaining_secs as f64 / duration_secs as f64
}

pub fn status_text(state: TimerState) -> &'static str {
    match state {
        TimerState::Running => "Running",
        TimerState::Paused => "Paused",
        TimerState::Completed => "Finished",
        TimerState::Idle => "Drag to set time",
    }
}

/// Receives the projection after every command and tick.
pub trait StatePublisher: Send {
    fn publish(&mut self, state: &PublishedState);
}

/// Drops every projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl StatePublisher for NullPublisher {
    fn publish(&mut self, _state: &PublishedState) {}
}

/// Feeds projections into a `tokio::sync::watch` channel; subscribers only
/// ever see the latest one.
#[derive(Debug)]
pub struct WatchPublisher {
    tx: watch::Sender<Option<PublishedState>>,
    /// Keep the receiver alive to prevent channel closure
    _rx: watch::Receiver<Option<PublishedState>>,
}

impl WatchPublisher {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { tx, _rx: rx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PublishedState>> {
        self.tx.subscribe()
    }
}

impl Default for WatchPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher for WatchPublisher {
    fn publish(&mut self, state: &PublishedState) {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(state) {
                false
            } else {
                *current = Some(state.clone());
                true
            }
        });
    }
}
