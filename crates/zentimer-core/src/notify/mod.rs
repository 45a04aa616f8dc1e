//! OS-level completion notification contract.
//!
//! At most one notification is ever pending, always under
//! [`TIMER_NOTIFICATION_ID`]; scheduling again replaces it.

mod stored;

pub use stored::{PendingNotification, StoredNotificationScheduler, PENDING_KEY};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

pub const TIMER_NOTIFICATION_ID: &str = "zentimer.timer-complete";
pub const TIMER_COMPLETE_CATEGORY: &str = "TIMER_COMPLETE";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(String);

impl ScheduleId {
    pub fn timer_complete() -> Self {
        Self(TIMER_NOTIFICATION_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub category: String,
    pub actions: Vec<String>,
}

impl NotificationPayload {
    /// Completion payload offering the Stop and Restart actions.
    pub fn timer_complete(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            category: TIMER_COMPLETE_CATEGORY.to_string(),
            actions: vec!["stop".to_string(), "restart".to_string()],
        }
    }
}

impl Default for NotificationPayload {
    fn default() -> Self {
        Self::timer_complete("Time's up", "Your ZenTimer session is complete.")
    }
}

/// What the user did with a delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    DefaultOpen,
    StopRequested,
    RestartRequested,
}

impl UserAction {
    /// Map a notification action identifier (`"stop"`, `"restart"`, `"open"`).
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "stop" => Some(Self::StopRequested),
            "restart" => Some(Self::RestartRequested),
            "open" | "default" => Some(Self::DefaultOpen),
            _ => None,
        }
    }
}

pub trait NotificationScheduler: Send {
    /// Schedule the completion notification at `deadline`, replacing any
    /// pending one.
    fn schedule(
        &mut self,
        deadline: DateTime<Utc>,
        payload: &NotificationPayload,
    ) -> Result<ScheduleId, NotifyError>;

    /// Cancel the pending notification. Idempotent.
    fn cancel(&mut self);
}

impl<N: NotificationScheduler + ?Sized> NotificationScheduler for Box<N> {
    fn schedule(
        &mut self,
        deadline: DateTime<Utc>,
        payload: &NotificationPayload,
    ) -> Result<ScheduleId, NotifyError> {
        (**self).schedule(deadline, payload)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}
