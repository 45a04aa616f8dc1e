//! Relaunch classification of a persisted running snapshot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::PersistedSnapshot;

/// Thresholds applied when deciding what a snapshot means after relaunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestorePolicy {
    /// Snapshots whose session started longer ago than this are ignored.
    pub stale_after: Duration,
    /// A deadline that passed less than this long ago still alerts.
    pub recent_completion_grace: Duration,
}

impl Default for RestorePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::hours(24),
            recent_completion_grace: Duration::seconds(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreDecision {
    /// Deadline still ahead: resume counting down.
    Resume { seconds_left: i64 },
    /// Deadline passed while the process was dead, recently enough to alert.
    CompletedRecently,
    /// Deadline passed long ago; drop it silently.
    CompletedLongAgo,
    /// The session itself is too old to trust.
    Stale,
}

/// What relaunch did with persisted state; carried on `Event::TimerRestored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOutcome {
    Resumed,
    ResumedPaused,
    Expired,
    Stale,
    Corrupt,
}

pub fn classify(
    snapshot: &PersistedSnapshot,
    now: DateTime<Utc>,
    policy: &RestorePolicy,
) -> RestoreDecision {
    if now - snapshot.started_at > policy.stale_after {
        return RestoreDecision::Stale;
    }

    let left = snapshot.deadline - now;
    if left > Duration::zero() {
        RestoreDecision::Resume {
            seconds_left: crate::clock::seconds_until(snapshot.deadline, now),
        }
    } else if left > -policy.recent_completion_grace {
        RestoreDecision::CompletedRecently
    } else {
        RestoreDecision::CompletedLongAgo
    }
}
