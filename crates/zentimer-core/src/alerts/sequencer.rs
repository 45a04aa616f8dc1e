use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::{AlertEffectsPlayer, AlertPreferences, DeviceError, EffectDevice, EffectPlan};

/// Timing of one completion alert.
///
/// Enabled effects play one after another on the worker thread: every
/// haptic pulse, then every flash pulse, then the chime. Each effect is
/// gated only by its own entry in the resolved plan, so turning one off
/// moves the next one earlier. With the default timings the chime starts
/// about 1.6 s after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPattern {
    pub haptic_pulses: u32,
    pub haptic_interval: Duration,
    pub flash_pulses: u32,
    pub flash_on: Duration,
    pub flash_off: Duration,
}

impl Default for AlertPattern {
    fn default() -> Self {
        Self {
            haptic_pulses: 3,
            haptic_interval: Duration::from_millis(400),
            flash_pulses: 3,
            flash_on: Duration::from_millis(150),
            flash_off: Duration::from_millis(150),
        }
    }
}

struct Worker {
    tx: Sender<AlertPreferences>,
    handle: JoinHandle<()>,
}

/// Runs alert sequences against an [`EffectDevice`] on a dedicated
/// `alert-effects` thread.
///
/// The thread is spawned on the first `play`. Clones share the same worker.
pub struct SequencedAlertPlayer<D: EffectDevice> {
    device: Arc<Mutex<Option<D>>>,
    worker: Arc<Mutex<Option<Worker>>>,
    pattern: AlertPattern,
}

impl<D: EffectDevice> Clone for SequencedAlertPlayer<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            worker: Arc::clone(&self.worker),
            pattern: self.pattern,
        }
    }
}

impl<D: EffectDevice> SequencedAlertPlayer<D> {
    pub fn new(device: D, pattern: AlertPattern) -> Self {
        Self {
            device: Arc::new(Mutex::new(Some(device))),
            worker: Arc::new(Mutex::new(None)),
            pattern,
        }
    }

    /// Let queued sequences finish, then stop the worker thread.
    pub fn shutdown(&self) {
        let worker = lock(&self.worker).take();
        if let Some(Worker { tx, handle }) = worker {
            drop(tx);
            if handle.join().is_err() {
                warn!("alert-effects thread panicked");
            }
        }
    }

    fn sender(&self) -> Option<Sender<AlertPreferences>> {
        let mut worker = lock(&self.worker);
        if let Some(existing) = worker.as_ref() {
            return Some(existing.tx.clone());
        }

        // The device moves onto the worker thread; a second spawn after
        // shutdown has nothing left to drive.
        let mut device = lock(&self.device).take()?;
        let pattern = self.pattern;
        let (tx, rx) = mpsc::channel::<AlertPreferences>();

        let spawned = thread::Builder::new()
            .name("alert-effects".to_string())
            .spawn(move || {
                while let Ok(prefs) = rx.recv() {
                    let plan = EffectPlan::resolve(&prefs, device.system_silenced());
                    run_sequence(&mut device, &plan, &pattern);
                }
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker {
                    tx: tx.clone(),
                    handle,
                });
                Some(tx)
            }
            Err(e) => {
                warn!("failed to spawn alert-effects thread: {e}");
                None
            }
        }
    }
}

impl<D: EffectDevice> AlertEffectsPlayer for SequencedAlertPlayer<D> {
    fn play(&self, prefs: &AlertPreferences) {
        match self.sender() {
            Some(tx) => {
                if tx.send(*prefs).is_err() {
                    warn!("alert-effects thread is gone; alert dropped");
                }
            }
            None => debug!("no effect device; alert dropped"),
        }
    }
}

/// Plays the plan in the fixed haptic, flash, chime order.
fn run_sequence<D: EffectDevice>(device: &mut D, plan: &EffectPlan, pattern: &AlertPattern) {
    if plan.is_empty() {
        debug!("all alert effects suppressed");
        return;
    }

    if plan.haptic {
        for pulse in 0..pattern.haptic_pulses {
            if pulse > 0 {
                thread::sleep(pattern.haptic_interval);
            }
            if !attempt("haptic", device.haptic_pulse()) {
                break;
            }
        }
    }

    if plan.flash {
        for _ in 0..pattern.flash_pulses {
            if !attempt("torch", device.set_torch(true)) {
                break;
            }
            thread::sleep(pattern.flash_on);
            attempt("torch", device.set_torch(false));
            thread::sleep(pattern.flash_off);
        }
    }

    if plan.sound {
        attempt("chime", device.play_chime());
    }
}

/// Returns whether the effect is worth trying again.
fn attempt(effect: &str, result: Result<(), DeviceError>) -> bool {
    match result {
        Ok(()) => true,
        Err(DeviceError::Unavailable) => false,
        Err(DeviceError::Failed(reason)) => {
            warn!("{effect} effect failed: {reason}");
            false
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct RecordingDevice {
        log: Arc<Mutex<Vec<String>>>,
        silenced: bool,
        has_torch: bool,
    }

    impl EffectDevice for RecordingDevice {
        fn haptic_pulse(&mut self) -> Result<(), DeviceError> {
            self.log.lock().unwrap().push("haptic".into());
            Ok(())
        }

        fn set_torch(&mut self, on: bool) -> Result<(), DeviceError> {
            if !self.has_torch {
                return Err(DeviceError::Unavailable);
            }
            self.log.lock().unwrap().push(format!("torch:{on}"));
            Ok(())
        }

        fn play_chime(&mut self) -> Result<(), DeviceError> {
            self.log.lock().unwrap().push("chime".into());
            Ok(())
        }

        fn system_silenced(&self) -> bool {
            self.silenced
        }
    }

    fn fast_pattern() -> AlertPattern {
        AlertPattern {
            haptic_pulses: 3,
            haptic_interval: Duration::from_millis(1),
            flash_pulses: 2,
            flash_on: Duration::from_millis(1),
            flash_off: Duration::from_millis(1),
        }
    }

    fn all_on(quiet: bool) -> AlertPreferences {
        AlertPreferences {
            haptic_enabled: true,
            flash_enabled: true,
            sound_enabled: true,
            quiet_mode_enabled: quiet,
        }
    }

    #[test]
    fn plays_full_sequence() {
        let device = RecordingDevice {
            has_torch: true,
            ..Default::default()
        };
        let log = device.log.clone();
        let player = SequencedAlertPlayer::new(device, fast_pattern());
        player.play(&all_on(false));
        player.shutdown();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "haptic", "haptic", "haptic", "torch:true", "torch:false", "torch:true",
                "torch:false", "chime"
            ]
        );
    }

    #[test]
    fn missing_torch_is_skipped_silently() {
        let device = RecordingDevice::default();
        let log = device.log.clone();
        let player = SequencedAlertPlayer::new(device, fast_pattern());
        player.play(&all_on(false));
        player.shutdown();

        let log = log.lock().unwrap();
        assert_eq!(log.iter().filter(|e| *e == "haptic").count(), 3);
        assert!(!log.iter().any(|e| e.starts_with("torch")));
        assert_eq!(log.last().map(String::as_str), Some("chime"));
    }

    #[test]
    fn quiet_mode_under_silence_plays_nothing() {
        let device = RecordingDevice {
            silenced: true,
            has_torch: true,
            ..Default::default()
        };
        let log = device.log.clone();
        let player = SequencedAlertPlayer::new(device, fast_pattern());
        player.play(&all_on(true));
        player.shutdown();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn each_effect_follows_its_own_toggle() {
        let device = RecordingDevice {
            has_torch: true,
            ..Default::default()
        };
        let log = device.log.clone();
        let player = SequencedAlertPlayer::new(device, fast_pattern());
        player.play(&AlertPreferences {
            haptic_enabled: false,
            flash_enabled: false,
            sound_enabled: true,
            quiet_mode_enabled: false,
        });
        player.shutdown();
        assert_eq!(*log.lock().unwrap(), vec!["chime"]);
    }
}
