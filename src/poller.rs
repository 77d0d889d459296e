//! Fixed-interval polling loop driving the automation engine.
//!
//! One cycle runs to completion before the next is considered, and the
//! shutdown signal is only observed between cycles, so an in-flight cycle
//! is never cancelled midway.

use crate::scheduling::{
    ports::{ExtensionLedger, TaskStore},
    services::AutomationEngine,
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Single-flight polling loop with signal-driven shutdown.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
}

impl Poller {
    /// Creates a poller with the given cycle interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Runs cycles until the shutdown signal fires or its sender is
    /// dropped.
    ///
    /// The first cycle starts immediately; later cycles wait out the
    /// interval. A cycle that overruns the interval delays the next tick
    /// instead of overlapping it.
    pub async fn run<S, L, C>(
        &self,
        engine: Arc<Mutex<AutomationEngine<S, L, C>>>,
        mut shutdown: watch::Receiver<bool>,
    ) where
        S: TaskStore,
        L: ExtensionLedger,
        C: Clock + Send + Sync,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mut engine_guard = engine.lock().await;
                    match engine_guard.run_cycle().await {
                        Ok(report) => info!(
                            "cycle complete: {} in, {} out, {} extended, {} restored, {} defaults, {} failures",
                            report.moved_in,
                            report.moved_out,
                            report.extended,
                            report.restored,
                            report.defaults_applied,
                            report.failures.len(),
                        ),
                        Err(err) => warn!("cycle aborted: {err}"),
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("poller stopped");
    }
}
