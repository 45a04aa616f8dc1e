use std::io::Write;

use clap::Subcommand;
use tracing::{info, warn};
use zentimer_core::timer::{drive, AppLifecycle, TimerState};
use zentimer_core::WatchPublisher;

use super::{CommandResult, Session};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to idle with the full duration
    Reset,
    /// Set the duration in minutes (1-60)
    Set {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Step the duration by whole minutes (1-99)
    Adjust {
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Set the duration from dial progress (0.0-1.0)
    Dial {
        #[arg(allow_negative_numbers = true)]
        progress: f64,
    },
    /// Start if needed and count down in the foreground until done or Ctrl-C
    Run,
}

pub fn run(action: TimerAction) -> CommandResult {
    if let TimerAction::Run = action {
        return run_foreground();
    }

    let mut session = Session::launch()?;
    let controller = &mut session.controller;
    let event = match action {
        TimerAction::Status => controller.on_app_foregrounded(),
        TimerAction::Start => controller.start(),
        TimerAction::Pause => controller.pause(),
        TimerAction::Reset => controller.reset(),
        TimerAction::Set { minutes } => controller.set_duration(minutes),
        TimerAction::Adjust { delta } => controller.adjust_duration(delta),
        TimerAction::Dial { progress } => {
            controller.begin_drag();
            let event = controller.set_duration_from_angle(progress);
            controller.end_drag();
            event
        }
        TimerAction::Run => None,
    };
    session.finish(event)
}

fn run_foreground() -> CommandResult {
    let publisher = WatchPublisher::new();
    let mut updates = publisher.subscribe();
    let mut session = Session::launch_with(AppLifecycle::Foreground, publisher)?;

    if session.controller.state() != TimerState::Running {
        session.controller.start();
    }
    let period = session.config.tick_interval();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let event = runtime.block_on(async {
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let latest = updates.borrow_and_update().clone();
                if let Some(state) = latest {
                    let mut stderr = std::io::stderr().lock();
                    let _ = write!(stderr, "\r{} {}   ", state.formatted_time, state.status_text);
                    let _ = stderr.flush();
                }
            }
        });

        drive(&mut session.controller, period, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("interrupted; the running session stays saved"),
                Err(e) => {
                    warn!("cannot listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    });
    eprintln!();

    session.finish(event)
}
