use chrono::Utc;
use clap::Subcommand;
use zentimer_core::notify::{PendingNotification, UserAction};
use zentimer_core::publish::NullPublisher;
use zentimer_core::timer::AppLifecycle;
use zentimer_core::{CoreError, Database, StoredNotificationScheduler};

use super::{CommandResult, Session};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Print the pending completion notification as JSON
    Pending,
    /// Deliver the pending notification if it is due
    Deliver,
    /// Respond to a delivered notification (stop, restart, open)
    Action {
        /// Action identifier
        action: String,
    },
}

pub fn run(action: NotifyAction) -> CommandResult {
    match action {
        NotifyAction::Pending => {
            // Relaunch reconciliation may already have consumed it.
            let session = Session::launch()?;
            let scheduler = StoredNotificationScheduler::new(Database::open()?);
            let pending = scheduler.pending()?;
            println!("{}", serde_json::to_string_pretty(&pending)?);
            session.finish(None)
        }
        NotifyAction::Deliver => deliver(),
        NotifyAction::Action { action } => {
            let action = UserAction::from_identifier(&action).ok_or_else(|| {
                CoreError::Custom(format!("unknown notification action: {action}"))
            })?;
            let mut session = Session::launch()?;
            let event = session.controller.handle_notification_action(action);
            session.finish(event)
        }
    }
}

/// Deliveries happen while the app is not on screen.
fn deliver() -> CommandResult {
    let mut session = Session::launch_with(AppLifecycle::Background, NullPublisher)?;
    let mut scheduler = StoredNotificationScheduler::new(Database::open()?);
    let delivered: Option<PendingNotification> = scheduler.take_due(Utc::now())?;

    let event = match &delivered {
        Some(notification) => {
            eprintln!(
                "notification: {} - {}",
                notification.payload.title, notification.payload.body
            );
            session
                .controller
                .on_notification_delivered(notification.deadline)
        }
        None => {
            eprintln!("no notification due");
            None
        }
    };
    session.finish(event)
}
