//! Alert toggles and the preferred session length.

use super::KeyValueStore;
use crate::alerts::AlertPreferences;
use crate::error::StorageError;

pub const HAPTIC_KEY: &str = "prefs.hapticEnabled";
pub const FLASH_KEY: &str = "prefs.flashEnabled";
pub const SOUND_KEY: &str = "prefs.soundEnabled";
pub const QUIET_MODE_KEY: &str = "prefs.quietModeEnabled";
pub const DURATION_MINUTES_KEY: &str = "prefs.durationMinutes";

/// Load alert preferences. Missing keys keep their defaults.
pub fn load_preferences(store: &dyn KeyValueStore) -> Result<AlertPreferences, StorageError> {
    let defaults = AlertPreferences::default();
    Ok(AlertPreferences {
        haptic_enabled: load_flag(store, HAPTIC_KEY, defaults.haptic_enabled)?,
        flash_enabled: load_flag(store, FLASH_KEY, defaults.flash_enabled)?,
        sound_enabled: load_flag(store, SOUND_KEY, defaults.sound_enabled)?,
        quiet_mode_enabled: load_flag(store, QUIET_MODE_KEY, defaults.quiet_mode_enabled)?,
    })
}

pub fn save_preferences(
    store: &dyn KeyValueStore,
    prefs: &AlertPreferences,
) -> Result<(), StorageError> {
    store.set_many(&[
        (HAPTIC_KEY, prefs.haptic_enabled.to_string()),
        (FLASH_KEY, prefs.flash_enabled.to_string()),
        (SOUND_KEY, prefs.sound_enabled.to_string()),
        (QUIET_MODE_KEY, prefs.quiet_mode_enabled.to_string()),
    ])
}

pub fn load_preferred_minutes(store: &dyn KeyValueStore) -> Result<Option<u32>, StorageError> {
    let Some(raw) = store.get(DURATION_MINUTES_KEY)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u32>()
        .map(Some)
        .map_err(|_| StorageError::Corrupt {
            key: DURATION_MINUTES_KEY.into(),
            message: format!("'{raw}' is not a whole number of minutes"),
        })
}

pub fn save_preferred_minutes(store: &dyn KeyValueStore, minutes: u32) -> Result<(), StorageError> {
    store.set(DURATION_MINUTES_KEY, &minutes.to_string())
}

fn load_flag(store: &dyn KeyValueStore, key: &str, default: bool) -> Result<bool, StorageError> {
    match store.get(key)? {
        None => Ok(default),
        Some(raw) => match raw.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(StorageError::Corrupt {
                key: key.into(),
                message: format!("'{other}' is not a boolean"),
            }),
        },
    }
}
