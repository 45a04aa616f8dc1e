//! One-shot completion handling keyed by session deadline.
//!
//! Three independent signals can announce the end of a session: the
//! in-process tick, the delivered OS notification, and the check made when
//! the app returns to the foreground (plus the relaunch check). Whichever
//! arrives first claims the deadline; the rest see it already handled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTrigger {
    Tick,
    Notification,
    Foreground,
    Restore,
    Pause,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionGuard {
    handled: Option<DateTime<Utc>>,
}

impl CompletionGuard {
    /// Returns `true` exactly once per deadline.
    pub fn claim(&mut self, deadline: DateTime<Utc>) -> bool {
        if self.handled == Some(deadline) {
            return false;
        }
        self.handled = Some(deadline);
        true
    }

    pub fn is_handled(&self, deadline: DateTime<Utc>) -> bool {
        self.handled == Some(deadline)
    }

    /// Forget the handled deadline. A new session may reuse the same
    /// deadline value after the wall clock steps backwards.
    pub fn clear(&mut self) {
        self.handled = None;
    }
}
