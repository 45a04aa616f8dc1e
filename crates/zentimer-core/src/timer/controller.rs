//! Countdown controller.
//!
//! Owns the single [`TimerSession`] and everything that has to stay in step
//! with it: the persisted snapshot, the pending OS notification, the tick
//! handle and the completion alert.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running ... -> Completed -> Idle (reset)
//! ```
//!
//! Remaining time is never counted down. While running, it is recomputed
//! from the deadline against the injected [`Clock`] on every tick, so a
//! suspended or killed process picks up exactly where the wall clock is.
//!
//! ## Usage
//!
//! ```ignore
//! let (mut controller, restored) = TimerController::builder()
//!     .store(Database::open()?)
//!     .launch();
//! controller.start();
//! // Every second:
//! controller.tick(); // Returns Some(Event) when the session completes
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::completion::{CompletionGuard, CompletionTrigger};
use super::restore::{classify, RestoreDecision, RestoreOutcome, RestorePolicy};
use super::session::{
    clamp_dial_minutes, clamp_stepper_minutes, minutes_from_progress, TimerSession, TimerState,
};
use super::tick::TickHandle;
use crate::alerts::{AlertEffectsPlayer, AlertPreferences, SilentAlertPlayer};
use crate::clock::{seconds_until, Clock, SystemClock};
use crate::error::StorageError;
use crate::events::{DurationSource, Event, Preference};
use crate::notify::{
    NotificationPayload, NotificationScheduler, StoredNotificationScheduler, UserAction,
};
use crate::publish::{DragState, NullPublisher, PublishedState, StatePublisher};
use crate::storage::{
    clear_paused, clear_snapshot, load_paused, load_preferences, load_preferred_minutes,
    load_snapshot, save_paused, save_preferences, save_preferred_minutes, save_snapshot, Config,
    KeyValueStore, MemoryStore, PausedRecord, PersistedSnapshot,
};

const NOTIFICATION_ADVISORY: &str =
    "Notifications are unavailable. Keep ZenTimer open to be alerted when time is up.";

/// Whether the host app is visible. In-app alerts only play in the
/// foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppLifecycle {
    #[default]
    Foreground,
    Background,
}

/// Values the controller takes from configuration.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub default_minutes: u32,
    pub restore_policy: RestorePolicy,
    pub notification: NotificationPayload,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_minutes: 5,
            restore_policy: RestorePolicy::default(),
            notification: NotificationPayload::default(),
        }
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_minutes: config.timer.default_minutes,
            restore_policy: config.restore_policy(),
            notification: config.notification_payload(),
        }
    }
}

/// Assembles a [`TimerController`] from its collaborators. Anything not
/// supplied gets an in-memory or silent stand-in.
pub struct TimerControllerBuilder {
    store: Option<Box<dyn KeyValueStore>>,
    notifier: Option<Box<dyn NotificationScheduler>>,
    alerts: Option<Box<dyn AlertEffectsPlayer>>,
    clock: Option<Box<dyn Clock>>,
    publisher: Option<Box<dyn StatePublisher>>,
    settings: ControllerSettings,
    lifecycle: AppLifecycle,
}

impl TimerControllerBuilder {
    fn new() -> Self {
        Self {
            store: None,
            notifier: None,
            alerts: None,
            clock: None,
            publisher: None,
            settings: ControllerSettings::default(),
            lifecycle: AppLifecycle::default(),
        }
    }

    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn notifier(mut self, notifier: impl NotificationScheduler + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn alerts(mut self, alerts: impl AlertEffectsPlayer + 'static) -> Self {
        self.alerts = Some(Box::new(alerts));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn publisher(mut self, publisher: impl StatePublisher + 'static) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    pub fn settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(self, config: &Config) -> Self {
        self.settings(ControllerSettings::from(config))
    }

    /// Lifecycle the host is in when the controller starts up.
    pub fn lifecycle(mut self, lifecycle: AppLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Build without consulting persisted state. Every command is ignored
    /// until [`TimerController::restore_on_launch`] runs.
    pub fn build(self) -> TimerController {
        let session = TimerSession::new(self.settings.default_minutes);
        TimerController {
            session,
            prefs: AlertPreferences::default(),
            drag: DragState::default(),
            lifecycle: self.lifecycle,
            completion: CompletionGuard::default(),
            tick: TickHandle::default(),
            launched: false,
            advisory: None,
            advisory_surfaced: false,
            settings: self.settings,
            store: self
                .store
                .unwrap_or_else(|| Box::new(MemoryStore::new())),
            notifier: self
                .notifier
                .unwrap_or_else(|| Box::new(StoredNotificationScheduler::new(MemoryStore::new()))),
            alerts: self.alerts.unwrap_or_else(|| Box::new(SilentAlertPlayer)),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            publisher: self.publisher.unwrap_or_else(|| Box::new(NullPublisher)),
        }
    }

    /// Build and immediately restore persisted state.
    pub fn launch(self) -> (TimerController, Option<Event>) {
        let mut controller = self.build();
        let restored = controller.restore_on_launch();
        (controller, restored)
    }
}

/// The countdown controller.
///
/// Every command returns `Some(Event)` describing the transition it made, or
/// `None` when it was not applicable in the current state. Commands never
/// fail: collaborator errors are logged and only weaken crash recovery.
pub struct TimerController {
    session: TimerSession,
    prefs: AlertPreferences,
    drag: DragState,
    lifecycle: AppLifecycle,
    completion: CompletionGuard,
    tick: TickHandle,
    launched: bool,
    advisory: Option<String>,
    advisory_surfaced: bool,
    settings: ControllerSettings,
    store: Box<dyn KeyValueStore>,
    notifier: Box<dyn NotificationScheduler>,
    alerts: Box<dyn AlertEffectsPlayer>,
    clock: Box<dyn Clock>,
    publisher: Box<dyn StatePublisher>,
}

impl TimerController {
    pub fn builder() -> TimerControllerBuilder {
        TimerControllerBuilder::new()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn state(&self) -> TimerState {
        self.session.state()
    }

    pub fn preferences(&self) -> &AlertPreferences {
        &self.prefs
    }

    pub fn lifecycle(&self) -> AppLifecycle {
        self.lifecycle
    }

    pub fn tick_handle(&self) -> &TickHandle {
        &self.tick
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn published(&self) -> PublishedState {
        PublishedState::project(
            &self.session,
            &self.prefs,
            &self.drag,
            self.advisory.as_deref(),
        )
    }

    // ── Launch ───────────────────────────────────────────────────────

    /// Reconcile with whatever a previous process persisted. Runs once;
    /// later calls are ignored.
    pub fn restore_on_launch(&mut self) -> Option<Event> {
        if self.launched {
            debug!("restore_on_launch already ran");
            return None;
        }
        self.launched = true;
        let now = self.clock.now();

        self.prefs = load_preferences(self.store.as_ref()).unwrap_or_else(|e| {
            warn!("failed to load alert preferences, using defaults: {e}");
            AlertPreferences::default()
        });

        let minutes = match load_preferred_minutes(self.store.as_ref()) {
            Ok(Some(minutes)) => clamp_stepper_minutes(minutes as i64),
            Ok(None) => self.settings.default_minutes,
            Err(e) => {
                warn!("failed to load preferred duration: {e}");
                self.settings.default_minutes
            }
        };
        self.session = TimerSession::new(minutes);

        let snapshot = match load_snapshot(self.store.as_ref(), self.session.duration_secs()) {
            Ok(snapshot) => snapshot,
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!("discarding corrupt timer snapshot: {e}");
                self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
                let paused = self.restore_paused(now);
                self.publish();
                return paused.or(Some(Event::TimerRestored {
                    outcome: RestoreOutcome::Corrupt,
                    remaining_secs: self.session.remaining_secs(),
                    at: now,
                }));
            }
            Err(e) => {
                warn!("failed to read timer snapshot: {e}");
                None
            }
        };

        let event = match snapshot {
            Some(snapshot) => self.restore_running(snapshot, now),
            None => self.restore_paused(now),
        };
        self.publish();
        event
    }

    fn restore_running(&mut self, snapshot: PersistedSnapshot, now: DateTime<Utc>) -> Option<Event> {
        // A snapshot always supersedes a paused record.
        self.persist("clear paused record", clear_paused(self.store.as_ref()));

        match classify(&snapshot, now, &self.settings.restore_policy) {
            RestoreDecision::Stale => {
                info!(started_at = %snapshot.started_at, "ignoring stale timer snapshot");
                self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
                Some(Event::TimerRestored {
                    outcome: RestoreOutcome::Stale,
                    remaining_secs: self.session.remaining_secs(),
                    at: now,
                })
            }
            RestoreDecision::Resume { seconds_left } => {
                self.session.restore_running(
                    snapshot.duration_secs,
                    snapshot.deadline,
                    snapshot.started_at,
                    seconds_left,
                );
                self.tick.arm();
                info!(
                    deadline = %snapshot.deadline,
                    remaining_secs = self.session.remaining_secs(),
                    "resumed running timer"
                );
                Some(Event::TimerRestored {
                    outcome: RestoreOutcome::Resumed,
                    remaining_secs: self.session.remaining_secs(),
                    at: now,
                })
            }
            RestoreDecision::CompletedRecently => {
                self.session.restore_running(
                    snapshot.duration_secs,
                    snapshot.deadline,
                    snapshot.started_at,
                    0,
                );
                self.finish(snapshot.deadline, CompletionTrigger::Restore)
            }
            RestoreDecision::CompletedLongAgo => {
                info!(deadline = %snapshot.deadline, "timer finished while closed");
                self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
                self.session.set_minutes(snapshot.duration_secs / 60);
                Some(Event::TimerRestored {
                    outcome: RestoreOutcome::Expired,
                    remaining_secs: self.session.remaining_secs(),
                    at: now,
                })
            }
        }
    }

    fn restore_paused(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match load_paused(self.store.as_ref()) {
            Ok(Some(record)) => {
                self.session
                    .restore_paused(record.duration_secs, record.remaining_secs);
                info!(remaining_secs = record.remaining_secs, "restored paused timer");
                Some(Event::TimerRestored {
                    outcome: RestoreOutcome::ResumedPaused,
                    remaining_secs: self.session.remaining_secs(),
                    at: now,
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!("discarding corrupt paused record: {e}");
                self.persist("clear paused record", clear_paused(self.store.as_ref()));
                None
            }
        }
    }

    // ── Duration ─────────────────────────────────────────────────────

    pub fn set_duration(&mut self, minutes: i64) -> Option<Event> {
        if !self.accepting("set_duration") || !self.is_idle("set_duration") {
            return None;
        }
        self.apply_minutes(clamp_dial_minutes(minutes), DurationSource::Direct)
    }

    /// Set the duration from dial progress in `0.0..=1.0`.
    pub fn set_duration_from_angle(&mut self, progress: f64) -> Option<Event> {
        if !self.accepting("set_duration_from_angle") || !self.is_idle("set_duration_from_angle") {
            return None;
        }
        let progress = if progress.is_finite() { progress } else { 0.0 };
        self.drag.drag_progress = Some(progress);
        let event = self.apply_minutes(minutes_from_progress(progress), DurationSource::Dial);
        if event.is_none() {
            self.publish();
        }
        event
    }

    /// Step the duration by `delta` minutes. Allows up to 99 minutes.
    pub fn adjust_duration(&mut self, delta: i64) -> Option<Event> {
        if !self.accepting("adjust_duration") || !self.is_idle("adjust_duration") {
            return None;
        }
        let minutes = clamp_stepper_minutes(self.session.minutes() as i64 + delta);
        self.apply_minutes(minutes, DurationSource::Stepper)
    }

    pub fn begin_drag(&mut self) -> Option<Event> {
        if !self.accepting("begin_drag") || !self.is_idle("begin_drag") || self.drag.is_dragging {
            return None;
        }
        self.drag.is_dragging = true;
        self.publish();
        Some(Event::DragChanged {
            dragging: true,
            at: self.clock.now(),
        })
    }

    pub fn end_drag(&mut self) -> Option<Event> {
        if !self.accepting("end_drag") || !self.drag.is_dragging {
            return None;
        }
        self.drag = DragState::default();
        self.publish();
        Some(Event::DragChanged {
            dragging: false,
            at: self.clock.now(),
        })
    }

    fn apply_minutes(&mut self, minutes: u32, source: DurationSource) -> Option<Event> {
        if minutes == self.session.minutes() {
            return None;
        }
        self.session.set_minutes(minutes);
        self.persist(
            "save preferred duration",
            save_preferred_minutes(self.store.as_ref(), minutes),
        );
        debug!(minutes, ?source, "duration changed");
        self.publish();
        Some(Event::DurationChanged {
            duration_secs: self.session.duration_secs(),
            source,
            at: self.clock.now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if !self.accepting("start") {
            return None;
        }
        match self.session.state() {
            TimerState::Idle | TimerState::Paused => {}
            TimerState::Running | TimerState::Completed => {
                debug!(state = ?self.session.state(), "start ignored");
                return None;
            }
        }

        let now = self.clock.now();
        let remaining = self.session.remaining_secs();
        let deadline = now + Duration::seconds(remaining as i64);
        let started_at = self.session.started_at().unwrap_or(now);
        self.session.run_until(deadline, started_at);
        self.completion.clear();
        self.drag = DragState::default();

        let snapshot = PersistedSnapshot {
            deadline,
            duration_secs: self.session.duration_secs(),
            started_at,
        };
        self.persist("save snapshot", save_snapshot(self.store.as_ref(), &snapshot));
        self.persist("clear paused record", clear_paused(self.store.as_ref()));

        if let Err(e) = self.notifier.schedule(deadline, &self.settings.notification) {
            warn!("failed to schedule completion notification: {e}");
            if !self.advisory_surfaced {
                self.advisory_surfaced = true;
                self.advisory = Some(NOTIFICATION_ADVISORY.to_string());
            }
        }

        self.tick.arm();
        info!(%deadline, remaining_secs = remaining, "timer started");
        self.publish();
        Some(Event::TimerStarted {
            deadline,
            remaining_secs: remaining,
            at: now,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.accepting("pause") {
            return None;
        }
        let Some(deadline) = self.running_deadline() else {
            debug!(state = ?self.session.state(), "pause ignored");
            return None;
        };

        let now = self.clock.now();
        let seconds_left = seconds_until(deadline, now);
        if seconds_left <= 0 {
            return self.finish(deadline, CompletionTrigger::Pause);
        }

        self.session.freeze(seconds_left);
        self.tick.disarm();
        self.notifier.cancel();
        self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
        let record = PausedRecord {
            remaining_secs: self.session.remaining_secs(),
            duration_secs: self.session.duration_secs(),
        };
        self.persist("save paused record", save_paused(self.store.as_ref(), &record));

        info!(remaining_secs = record.remaining_secs, "timer paused");
        self.publish();
        Some(Event::TimerPaused {
            remaining_secs: record.remaining_secs,
            at: now,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        if !self.accepting("reset") {
            return None;
        }
        self.notifier.cancel();
        self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
        self.persist("clear paused record", clear_paused(self.store.as_ref()));
        self.session.reset();
        self.completion.clear();
        self.tick.disarm();

        info!("timer reset");
        self.publish();
        Some(Event::TimerReset {
            duration_secs: self.session.duration_secs(),
            at: self.clock.now(),
        })
    }

    /// Re-derive remaining time from the deadline. Returns the completion
    /// event once the deadline is reached.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.launched {
            return None;
        }
        self.reconcile(CompletionTrigger::Tick)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn on_app_foregrounded(&mut self) -> Option<Event> {
        self.lifecycle = AppLifecycle::Foreground;
        if !self.launched {
            return None;
        }
        let event = self.reconcile(CompletionTrigger::Foreground);
        if event.is_none() {
            self.publish();
        }
        event
    }

    pub fn on_app_backgrounded(&mut self) -> Option<Event> {
        self.lifecycle = AppLifecycle::Background;
        None
    }

    /// The OS delivered the completion notification for `deadline`.
    pub fn on_notification_delivered(&mut self, deadline: DateTime<Utc>) -> Option<Event> {
        if !self.accepting("on_notification_delivered") {
            return None;
        }
        if self.running_deadline() == Some(deadline) {
            return self.finish(deadline, CompletionTrigger::Notification);
        }
        if self.completion.is_handled(deadline) {
            debug!(%deadline, "notification for a completion already handled");
        } else {
            debug!(%deadline, "notification for a deadline no longer scheduled");
        }
        None
    }

    pub fn handle_notification_action(&mut self, action: UserAction) -> Option<Event> {
        match action {
            UserAction::StopRequested => self.reset(),
            UserAction::RestartRequested => {
                self.reset();
                self.start()
            }
            UserAction::DefaultOpen => self.on_app_foregrounded(),
        }
    }

    // ── Preferences ──────────────────────────────────────────────────

    pub fn toggle_haptic(&mut self) -> Option<Event> {
        self.toggle(Preference::Haptic)
    }

    pub fn toggle_flash(&mut self) -> Option<Event> {
        self.toggle(Preference::Flash)
    }

    pub fn toggle_sound(&mut self) -> Option<Event> {
        self.toggle(Preference::Sound)
    }

    pub fn toggle_quiet_mode(&mut self) -> Option<Event> {
        self.toggle(Preference::QuietMode)
    }

    fn toggle(&mut self, preference: Preference) -> Option<Event> {
        if !self.accepting("toggle") {
            return None;
        }
        let flag = match preference {
            Preference::Haptic => &mut self.prefs.haptic_enabled,
            Preference::Flash => &mut self.prefs.flash_enabled,
            Preference::Sound => &mut self.prefs.sound_enabled,
            Preference::QuietMode => &mut self.prefs.quiet_mode_enabled,
        };
        *flag = !*flag;
        let enabled = *flag;

        self.persist("save preferences", save_preferences(self.store.as_ref(), &self.prefs));
        self.publish();
        Some(Event::PreferenceToggled {
            preference,
            enabled,
            message: format!("{} {}", preference.label(), if enabled { "on" } else { "off" }),
            at: self.clock.now(),
        })
    }

    pub fn dismiss_advisory(&mut self) {
        if self.advisory.take().is_some() {
            self.publish();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn running_deadline(&self) -> Option<DateTime<Utc>> {
        match self.session.state() {
            TimerState::Running => self.session.deadline(),
            _ => None,
        }
    }

    fn reconcile(&mut self, trigger: CompletionTrigger) -> Option<Event> {
        let deadline = self.running_deadline()?;
        let seconds_left = seconds_until(deadline, self.clock.now());
        if seconds_left <= 0 {
            return self.finish(deadline, trigger);
        }
        self.session.sync_remaining(seconds_left);
        self.publish();
        None
    }

    /// The only path into `Completed`. Whichever trigger claims `deadline`
    /// first runs the side effects; every later claim is a no-op.
    fn finish(&mut self, deadline: DateTime<Utc>, trigger: CompletionTrigger) -> Option<Event> {
        if !self.completion.claim(deadline) {
            debug!(%deadline, ?trigger, "completion already handled");
            return None;
        }

        self.session.complete();
        self.tick.disarm();
        self.drag = DragState::default();
        self.persist("clear snapshot", clear_snapshot(self.store.as_ref()));
        self.persist("clear paused record", clear_paused(self.store.as_ref()));

        let alerted = self.lifecycle == AppLifecycle::Foreground;
        if alerted {
            self.alerts.play(&self.prefs);
            // The in-app alert replaces the OS banner.
            self.notifier.cancel();
        }

        info!(%deadline, ?trigger, alerted, "timer completed");
        self.publish();
        Some(Event::TimerCompleted {
            deadline,
            trigger,
            alerted,
            at: self.clock.now(),
        })
    }

    fn accepting(&self, command: &str) -> bool {
        if !self.launched {
            debug!(command, "ignored before restore_on_launch");
        }
        self.launched
    }

    fn is_idle(&self, command: &str) -> bool {
        let idle = self.session.state() == TimerState::Idle;
        if !idle {
            debug!(command, state = ?self.session.state(), "only allowed while idle");
        }
        idle
    }

    fn persist(&self, what: &str, result: Result<(), StorageError>) {
        if let Err(e) = result {
            warn!("failed to {what}: {e}");
        }
    }

    fn publish(&mut self) {
        let state = self.published();
        self.publisher.publish(&state);
    }
}
