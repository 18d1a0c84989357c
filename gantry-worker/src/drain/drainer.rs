//! Drain state machine
//!
//! For as long as the supervised worker process is alive, repeatedly
//! signals the coordinator to stop using this worker, escalating to
//! forcible deletion when a shutdown drain exceeds its time budget.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use super::watch::WatchProcess;
use crate::beacon::BeaconClient;
use crate::clock::Clock;
use crate::error::Result;
use crate::{DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_PROBES_PER_CYCLE};

/// What the drain is preparing the worker for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainMode {
    /// Reconfigure: land the worker so it stops taking new builds but
    /// may come back
    Land,
    /// Shutdown: retire the worker permanently
    Retire,
}

/// Configuration for one drain run
#[derive(Debug, Clone)]
pub struct DrainConfig {
    /// Drain mode
    pub mode: DrainMode,
    /// Interval between individual liveness probes; must be positive
    pub check_interval: Duration,
    /// Probes per cycle; one coordinator signal is issued per cycle.
    /// Must be positive
    pub probes_per_cycle: u32,
    /// Absolute time budget measured from the start of the drain. Once
    /// exceeded, a shutdown drain escalates to forcible deletion and a
    /// reconfigure drain gives up landing
    pub timeout: Option<Duration>,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            mode: DrainMode::Land,
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            probes_per_cycle: DEFAULT_PROBES_PER_CYCLE,
            timeout: None,
        }
    }
}

enum CycleOutcome {
    KeepDraining,
    Done,
}

/// Drives a worker out of the coordinator's active pool
///
/// Strictly sequential: one `drain` call runs the whole state machine
/// on the caller's task and spawns nothing. At most one coordinator
/// signal is ever in flight.
pub struct Drainer {
    config: DrainConfig,
    watch_process: Arc<dyn WatchProcess>,
    beacon_client: Arc<dyn BeaconClient>,
    clock: Arc<dyn Clock>,
}

impl Drainer {
    /// Create a new drainer
    pub fn new(
        config: DrainConfig,
        watch_process: Arc<dyn WatchProcess>,
        beacon_client: Arc<dyn BeaconClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            watch_process,
            beacon_client,
            clock,
        }
    }

    /// Run the drain to completion
    ///
    /// Returns an error only for fatal outcomes: a failed liveness
    /// probe, or a failed forcible deletion. Soft-signal failures are
    /// retried; an unreachable coordinator ends the drain successfully,
    /// since there is nobody left to inform.
    pub async fn drain(&self) -> Result<()> {
        self.run().instrument(info_span!("drain")).await
    }

    async fn run(&self) -> Result<()> {
        if !self.watch_process.is_running().await? {
            info!("worker process already stopped, nothing to drain");
            return Ok(());
        }

        let deadline = self.config.timeout.map(|t| self.clock.now() + t);

        loop {
            // Escalation is decided at cycle boundaries only, never
            // mid-sleep or mid-call
            let past_deadline = deadline.map_or(false, |d| self.clock.now() > d);

            match self.signal_cycle(past_deadline).await? {
                CycleOutcome::Done => return Ok(()),
                CycleOutcome::KeepDraining => {}
            }

            for _ in 0..self.config.probes_per_cycle {
                self.clock.sleep(self.config.check_interval).await;
                if !self.watch_process.is_running().await? {
                    info!("worker process exited, drain complete");
                    return Ok(());
                }
            }
        }
    }

    /// Issue this cycle's coordinator signal, if any
    async fn signal_cycle(&self, past_deadline: bool) -> Result<CycleOutcome> {
        if past_deadline {
            return match self.config.mode {
                DrainMode::Land => {
                    info!("drain timeout elapsed, giving up landing");
                    Ok(CycleOutcome::Done)
                }
                DrainMode::Retire => {
                    info!("drain timeout elapsed, deleting worker forcibly");
                    match self.beacon_client.delete_worker().await {
                        Ok(()) => Ok(CycleOutcome::Done),
                        Err(e) if e.is_unreachable() => {
                            info!("no coordinator reachable for delete, drain complete");
                            Ok(CycleOutcome::Done)
                        }
                        Err(e) => Err(e),
                    }
                }
            };
        }

        let (verb, result) = match self.config.mode {
            DrainMode::Land => ("land", self.beacon_client.land_worker().await),
            DrainMode::Retire => ("retire", self.beacon_client.retire_worker().await),
        };

        match result {
            Ok(()) => Ok(CycleOutcome::KeepDraining),
            Err(e) if e.is_unreachable() => {
                info!("no coordinator reachable, drain complete");
                Ok(CycleOutcome::Done)
            }
            Err(e) => {
                // Soft failures never surface; the next cycle retries
                warn!("failed to {} worker, will retry: {}", verb, e);
                Ok(CycleOutcome::KeepDraining)
            }
        }
    }
}
