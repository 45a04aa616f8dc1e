//! TOML-based application configuration.
//!
//! Holds the tunables that are not user toggles:
//! - Default session length and tick cadence
//! - Relaunch thresholds
//! - Completion notification text
//! - Alert pulse timing
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::alerts::AlertPattern;
use crate::error::ConfigError;
use crate::notify::NotificationPayload;
use crate::timer::RestorePolicy;

/// Timer behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u32,
    #[serde(default = "default_recent_completion_grace_secs")]
    pub recent_completion_grace_secs: u32,
}

/// Text of the completion notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
}

/// Completion alert sequencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_haptic_pulses")]
    pub haptic_pulses: u32,
    #[serde(default = "default_haptic_interval_ms")]
    pub haptic_interval_ms: u64,
    #[serde(default = "default_flash_pulses")]
    pub flash_pulses: u32,
    #[serde(default = "default_flash_on_ms")]
    pub flash_on_ms: u64,
    #[serde(default = "default_flash_off_ms")]
    pub flash_off_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_minutes() -> u32 {
    5
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_stale_after_hours() -> u32 {
    24
}
fn default_recent_completion_grace_secs() -> u32 {
    60
}
fn default_title() -> String {
    "Time's up".into()
}
fn default_body() -> String {
    "Your ZenTimer session is complete.".into()
}
fn default_haptic_pulses() -> u32 {
    3
}
fn default_haptic_interval_ms() -> u64 {
    400
}
fn default_flash_pulses() -> u32 {
    3
}
fn default_flash_on_ms() -> u64 {
    150
}
fn default_flash_off_ms() -> u64 {
    150
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            stale_after_hours: default_stale_after_hours(),
            recent_completion_grace_secs: default_recent_completion_grace_secs(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            body: default_body(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            haptic_pulses: default_haptic_pulses(),
            haptic_interval_ms: default_haptic_interval_ms(),
            flash_pulses: default_flash_pulses(),
            flash_on_ms: default_flash_on_ms(),
            flash_off_ms: default_flash_off_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            }
        }

        let obj = current
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(leaf)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot replace a whole section".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or falls outside the accepted range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every dot-path key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            flatten("", &json, &mut out);
        }
        out
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if !(1..=99).contains(&self.timer.default_minutes) {
            return Err(invalid("timer.default_minutes", "must be between 1 and 99"));
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(invalid("timer.tick_interval_ms", "must be positive"));
        }
        if self.timer.stale_after_hours == 0 {
            return Err(invalid("timer.stale_after_hours", "must be positive"));
        }
        Ok(())
    }

    pub fn restore_policy(&self) -> RestorePolicy {
        RestorePolicy {
            stale_after: Duration::hours(self.timer.stale_after_hours as i64),
            recent_completion_grace: Duration::seconds(
                self.timer.recent_completion_grace_secs as i64,
            ),
        }
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timer.tick_interval_ms)
    }

    pub fn notification_payload(&self) -> NotificationPayload {
        NotificationPayload::timer_complete(&self.notification.title, &self.notification.body)
    }

    pub fn alert_pattern(&self) -> AlertPattern {
        AlertPattern {
            haptic_pulses: self.alerts.haptic_pulses,
            haptic_interval: std::time::Duration::from_millis(self.alerts.haptic_interval_ms),
            flash_pulses: self.alerts.flash_pulses,
            flash_on: std::time::Duration::from_millis(self.alerts.flash_on_ms),
            flash_off: std::time::Duration::from_millis(self.alerts.flash_off_ms),
        }
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
