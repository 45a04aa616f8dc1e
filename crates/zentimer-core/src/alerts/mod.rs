//! Completion alert effects.
//!
//! The controller only says "the session finished, here are the user's
//! toggles". Turning that into vibration pulses, torch flashes and a chime
//! is the player's job, and it never reports failure back.

mod sequencer;

pub use sequencer::{AlertPattern, SequencedAlertPlayer};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-chosen completion effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPreferences {
    pub haptic_enabled: bool,
    pub flash_enabled: bool,
    pub sound_enabled: bool,
    pub quiet_mode_enabled: bool,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        Self {
            haptic_enabled: true,
            flash_enabled: false,
            sound_enabled: false,
            quiet_mode_enabled: false,
        }
    }
}

/// Which effects actually play once quiet mode and the device's silent state
/// are taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectPlan {
    pub haptic: bool,
    pub flash: bool,
    pub sound: bool,
}

impl EffectPlan {
    pub fn resolve(prefs: &AlertPreferences, system_silenced: bool) -> Self {
        if prefs.quiet_mode_enabled {
            return Self {
                haptic: prefs.haptic_enabled && !system_silenced,
                flash: false,
                sound: false,
            };
        }
        Self {
            haptic: prefs.haptic_enabled,
            flash: prefs.flash_enabled,
            sound: prefs.sound_enabled,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.haptic || self.flash || self.sound)
    }
}

/// Fire-and-forget completion alert.
pub trait AlertEffectsPlayer: Send {
    fn play(&self, prefs: &AlertPreferences);
}

/// Plays nothing. Used when the host has no effect hardware at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlertPlayer;

impl AlertEffectsPlayer for SilentAlertPlayer {
    fn play(&self, _prefs: &AlertPreferences) {}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The hardware for this effect does not exist on this device.
    #[error("effect hardware unavailable")]
    Unavailable,

    #[error("effect failed: {0}")]
    Failed(String),
}

/// Hardware primitives an alert sequence is built from.
pub trait EffectDevice: Send + 'static {
    fn haptic_pulse(&mut self) -> Result<(), DeviceError>;

    fn set_torch(&mut self, on: bool) -> Result<(), DeviceError>;

    fn play_chime(&mut self) -> Result<(), DeviceError>;

    /// Whether a system-level silent or focus mode is active.
    fn system_silenced(&self) -> bool {
        false
    }
}
