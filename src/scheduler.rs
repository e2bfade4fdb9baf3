//! Fixed-period cycle scheduling
//!
//! The scheduler owns its timer and its shutdown channel; nothing lives in
//! process-wide state. One cycle runs immediately at startup, then one per
//! period. Cycles are serialized: the loop awaits the running cycle before
//! taking the next tick, and ticks that elapsed during a long cycle are
//! skipped rather than replayed.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::orchestrator::CommitOrchestrator;

pub struct Scheduler {
    period: Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Stops the scheduler from outside the run loop. The stop is observed
/// between cycles; a running cycle always finishes first.
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            period,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    pub async fn run(mut self, orchestrator: CommitOrchestrator) {
        let mut ticks = tokio::time::interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    Self::run_cycle_logged(&orchestrator).await;
                }
                result = self.shutdown_rx.changed() => {
                    if result.is_err() || *self.shutdown_rx.borrow() {
                        debug!("scheduler stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Errors end the cycle, never the process; the next tick retries.
    async fn run_cycle_logged(orchestrator: &CommitOrchestrator) {
        match orchestrator.run_cycle().await {
            Ok(report) => {
                if let Ok(json) = serde_json::to_string(&report) {
                    debug!("cycle finished: {json}");
                }
            }
            Err(err) => error!("cycle failed: {err}"),
        }
    }
}
