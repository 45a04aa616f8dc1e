//! Tick scheduling handle and the async tick driver.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::controller::TimerController;
use crate::events::Event;

/// Tracks whether the ~1 Hz tick should be running.
///
/// Arming bumps the generation so a driver still holding an older generation
/// knows its handle was invalidated. Both operations are idempotent.
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    generation: u64,
    armed: bool,
}

impl TickHandle {
    pub fn arm(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        self.generation
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.armed && self.generation == generation
    }
}

/// Tick `controller` every `period` until the session completes, the tick is
/// disarmed, or `shutdown` resolves.
///
/// Returns the completion event when the session finished on a tick.
pub async fn drive<F>(
    controller: &mut TimerController,
    period: Duration,
    shutdown: F,
) -> Option<Event>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if !controller.tick_handle().is_armed() {
            debug!("tick disarmed, driver stopping");
            return None;
        }
        tokio::select! {
            _ = &mut shutdown => {
                debug!("tick driver shut down");
                return None;
            }
            _ = ticker.tick() => {
                if let Some(event) = controller.tick() {
                    return Some(event);
                }
            }
        }
    }
}
