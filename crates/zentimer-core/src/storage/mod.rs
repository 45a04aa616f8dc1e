mod config;
pub mod database;
pub mod memory;
pub mod preferences;
pub mod snapshot;

pub use config::{AlertsConfig, Config, LoggingConfig, NotificationConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use preferences::{load_preferences, load_preferred_minutes, save_preferences, save_preferred_minutes};
pub use snapshot::{
    clear_paused, clear_snapshot, load_paused, load_snapshot, save_paused, save_snapshot,
    PausedRecord, PersistedSnapshot,
};

use std::path::PathBuf;

use crate::error::StorageError;

/// Durable key-value persistence used for snapshots and preferences.
///
/// `set_many` and `remove_many` must apply all entries or none, so a reader
/// never observes half of a snapshot.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value.to_string())])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove_many(keys)
    }
}

/// Returns the data directory.
///
/// `ZENTIMER_DATA_DIR` wins when set; otherwise `~/.config/zentimer[-dev]/`
/// based on ZENTIMER_ENV (set ZENTIMER_ENV=dev for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("ZENTIMER_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ZENTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("zentimer-dev")
            } else {
                base_dir.join("zentimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
