use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::controller::Command;

/// Periodic clock for one question.
///
/// Sends `Command::Tick` tagged with the question index it was started for and
/// a generation unique to this ticker. The background task is aborted when the `Ticker` is dropped, so replacing or
/// clearing the owner's `Option<Ticker>` is how the clock is stopped.
pub(crate) struct Ticker {
    index: usize,
    generation: u64,
    task: JoinHandle<()>,
}

impl Ticker {
    pub(crate) fn spawn(
        index: usize,
        generation: u64,
        period: Duration,
        commands: mpsc::Sender<Command>,
    ) -> Self {
        let task = tokio::spawn(async move {
            // First tick lands one full period after the question starts.
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = Command::Tick { generation, index };
                if commands.send(tick).await.is_err() {
                    break;
                }
            }
        });
        Self {
            index,
            generation,
            task,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
