//! Alert effects rendered on a terminal.

use std::io::Write;

use zentimer_core::alerts::{DeviceError, EffectDevice};

/// Writes each effect to stderr. A terminal has no torch, so flash pulses
/// are skipped; the chime rings the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalDevice;

impl TerminalDevice {
    fn emit(&self, line: &str) -> Result<(), DeviceError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{line}").map_err(|e| DeviceError::Failed(e.to_string()))
    }
}

impl EffectDevice for TerminalDevice {
    fn haptic_pulse(&mut self) -> Result<(), DeviceError> {
        self.emit("alert: buzz")
    }

    fn set_torch(&mut self, _on: bool) -> Result<(), DeviceError> {
        Err(DeviceError::Unavailable)
    }

    fn play_chime(&mut self) -> Result<(), DeviceError> {
        self.emit("\x07alert: chime")
    }

    fn system_silenced(&self) -> bool {
        std::env::var_os("ZENTIMER_SILENCED").is_some()
    }
}
