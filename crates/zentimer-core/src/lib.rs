//! # ZenTimer Core Library
//!
//! Core logic for the ZenTimer focus timer. The same library backs the
//! `zentimer-cli` binary and any GUI or widget host.
//!
//! ## Architecture
//!
//! - **Timer Controller**: a deadline-based state machine. The caller drives
//!   it with `tick()` (or [`timer::drive`]) and lifecycle signals
//! - **Storage**: SQLite key-value persistence for crash recovery and
//!   preferences, TOML configuration
//! - **Notifications**: one OS-level completion notification under a fixed id
//! - **Alerts**: haptic, flash and chime sequences on a dedicated thread
//!
//! ## Key Components
//!
//! - [`TimerController`]: the countdown state machine
//! - [`Database`]: durable key-value store
//! - [`Config`]: application configuration management
//! - [`NotificationScheduler`]: trait for the OS notification collaborator
//! - [`AlertEffectsPlayer`]: trait for completion effects

pub mod alerts;
pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod publish;
pub mod storage;
pub mod timer;

pub use alerts::{AlertEffectsPlayer, AlertPreferences, EffectDevice, SequencedAlertPlayer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{NotificationScheduler, StoredNotificationScheduler, UserAction};
pub use publish::{LiveActivityState, PublishedState, StatePublisher, WatchPublisher};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{TimerController, TimerState};
