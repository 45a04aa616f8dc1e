pub mod config;
pub mod notify;
pub mod prefs;
pub mod timer;

use serde::Serialize;
use zentimer_core::publish::{NullPublisher, PublishedState, StatePublisher};
use zentimer_core::error::Result;
use zentimer_core::timer::AppLifecycle;
use zentimer_core::{
    Config, Database, Event, SequencedAlertPlayer, StoredNotificationScheduler, TimerController,
};

use crate::device::TerminalDevice;

pub type CommandResult = Result<()>;

/// One CLI invocation's controller. Every invocation is a fresh process, so
/// launching always runs the relaunch reconciliation first.
pub struct Session {
    pub controller: TimerController,
    pub restored: Option<Event>,
    pub config: Config,
    alerts: SequencedAlertPlayer<TerminalDevice>,
}

impl Session {
    pub fn launch() -> Result<Self> {
        Self::launch_with(AppLifecycle::Foreground, NullPublisher)
    }

    pub fn launch_with(
        lifecycle: AppLifecycle,
        publisher: impl StatePublisher + 'static,
    ) -> Result<Self> {
        let config = Config::load()?;
        let alerts = SequencedAlertPlayer::new(TerminalDevice, config.alert_pattern());
        let (controller, restored) = TimerController::builder()
            .store(Database::open()?)
            .notifier(StoredNotificationScheduler::new(Database::open()?))
            .alerts(alerts.clone())
            .publisher(publisher)
            .config(&config)
            .lifecycle(lifecycle)
            .launch();
        Ok(Self {
            controller,
            restored,
            config,
            alerts,
        })
    }

    /// Print the report for `event` and let any alert sequence finish.
    pub fn finish(self, event: Option<Event>) -> CommandResult {
        let report = Report {
            restored: self.restored.as_ref(),
            event: event.as_ref(),
            state: self.controller.published(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        self.close();
        Ok(())
    }

    /// Let any alert sequence started during this invocation finish.
    pub fn close(self) {
        self.alerts.shutdown();
    }
}

#[derive(Serialize)]
struct Report<'a> {
    restored: Option<&'a Event>,
    event: Option<&'a Event>,
    state: PublishedState,
}
