use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CompletionTrigger, RestoreOutcome};

/// How a new duration was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    Direct,
    Dial,
    Stepper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Haptic,
    Flash,
    Sound,
    QuietMode,
}

impl Preference {
    pub fn label(self) -> &'static str {
        match self {
            Preference::Haptic => "Vibration",
            Preference::Flash => "Flash",
            Preference::Sound => "Sound",
            Preference::QuietMode => "Quiet mode",
        }
    }
}

/// Every state change the controller makes produces an Event.
/// Commands that change nothing produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DurationChanged {
        duration_secs: u32,
        source: DurationSource,
        at: DateTime<Utc>,
    },
    TimerStarted {
        deadline: DateTime<Utc>,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        deadline: DateTime<Utc>,
        trigger: CompletionTrigger,
        /// Whether in-app alert effects were played.
        alerted: bool,
        at: DateTime<Utc>,
    },
    /// Relaunch found persisted state and acted on it.
    TimerRestored {
        outcome: RestoreOutcome,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    PreferenceToggled {
        preference: Preference,
        enabled: bool,
        message: String,
        at: DateTime<Utc>,
    },
    DragChanged {
        dragging: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::TimerPaused {
            remaining_secs: 42,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerPaused");
        assert_eq!(json["remaining_secs"], 42);
    }

    #[test]
    fn completion_trigger_serializes_snake_case() {
        let event = Event::TimerCompleted {
            deadline: Utc::now(),
            trigger: CompletionTrigger::Notification,
            alerted: false,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["trigger"], "notification");
    }
}
