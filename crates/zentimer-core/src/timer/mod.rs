mod completion;
mod controller;
mod restore;
mod session;
mod tick;

pub use completion::{CompletionGuard, CompletionTrigger};
pub use controller::{AppLifecycle, ControllerSettings, TimerController, TimerControllerBuilder};
pub use restore::{classify, RestoreDecision, RestoreOutcome, RestorePolicy};
pub use session::{
    clamp_dial_minutes, clamp_stepper_minutes, minutes_from_progress, TimerSession, TimerState,
    DIAL_MAX_MINUTES, MIN_MINUTES, STEPPER_MAX_MINUTES,
};
pub use tick::{drive, TickHandle};
