//! Shared fakes for controller integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use zentimer_core::alerts::{AlertEffectsPlayer, AlertPreferences};
use zentimer_core::error::{NotifyError, StorageError};
use zentimer_core::events::Event;
use zentimer_core::notify::{NotificationPayload, NotificationScheduler, ScheduleId};
use zentimer_core::storage::KeyValueStore;
use zentimer_core::{ManualClock, MemoryStore, TimerController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule(DateTime<Utc>),
    Cancel,
}

/// Records every schedule/cancel so tests can check the notification
/// bookkeeping.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    calls: Arc<Mutex<Vec<SchedulerCall>>>,
}

impl RecordingScheduler {
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scheduled(&self) -> Vec<DateTime<Utc>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SchedulerCall::Schedule(deadline) => Some(deadline),
                SchedulerCall::Cancel => None,
            })
            .collect()
    }

    /// Deadline of the notification still pending after all calls.
    pub fn pending(&self) -> Option<DateTime<Utc>> {
        self.calls()
            .into_iter()
            .fold(None, |pending, call| match call {
                SchedulerCall::Schedule(deadline) => Some(deadline),
                SchedulerCall::Cancel => None,
            })
    }
}

impl NotificationScheduler for RecordingScheduler {
    fn schedule(
        &mut self,
        deadline: DateTime<Utc>,
        _payload: &NotificationPayload,
    ) -> Result<ScheduleId, NotifyError> {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Schedule(deadline));
        Ok(ScheduleId::timer_complete())
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push(SchedulerCall::Cancel);
    }
}

/// A scheduler whose user never granted notification permission.
#[derive(Clone, Default)]
pub struct DeniedScheduler;

impl NotificationScheduler for DeniedScheduler {
    fn schedule(
        &mut self,
        _deadline: DateTime<Utc>,
        _payload: &NotificationPayload,
    ) -> Result<ScheduleId, NotifyError> {
        Err(NotifyError::PermissionDenied)
    }

    fn cancel(&mut self) {}
}

#[derive(Clone, Default)]
pub struct CountingAlerts {
    plays: Arc<Mutex<Vec<AlertPreferences>>>,
}

impl CountingAlerts {
    pub fn count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<AlertPreferences> {
        self.plays.lock().unwrap().last().copied()
    }
}

impl AlertEffectsPlayer for CountingAlerts {
    fn play(&self, prefs: &AlertPreferences) {
        self.plays.lock().unwrap().push(*prefs);
    }
}

/// A store where every operation fails.
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disk unplugged".into()))
    }

    fn set_many(&self, _entries: &[(&str, String)]) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk unplugged".into()))
    }

    fn remove_many(&self, _keys: &[&str]) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk unplugged".into()))
    }
}

/// One simulated process: fresh collaborators over a shared store and clock.
pub struct Process {
    pub scheduler: RecordingScheduler,
    pub alerts: CountingAlerts,
    pub controller: TimerController,
    pub restored: Option<Event>,
}

pub fn launch(store: &MemoryStore, clock: &ManualClock) -> Process {
    let scheduler = RecordingScheduler::default();
    let alerts = CountingAlerts::default();
    let (controller, restored) = TimerController::builder()
        .store(store.clone())
        .clock(clock.clone())
        .notifier(scheduler.clone())
        .alerts(alerts.clone())
        .launch();
    Process {
        scheduler,
        alerts,
        controller,
        restored,
    }
}
