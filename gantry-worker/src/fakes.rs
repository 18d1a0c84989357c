//! Test doubles for the drain collaborators
//!
//! Scripted stand-ins for the beacon client and the process probe,
//! used together with [`crate::clock::TestClock`] to drive the drain
//! loop deterministically.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::beacon::BeaconClient;
use crate::drain::WatchProcess;
use crate::error::{GantryError, Result};

#[derive(Default)]
struct VerbState {
    error: Option<GantryError>,
    calls: u32,
}

impl VerbState {
    fn record(&mut self) -> Result<()> {
        self.calls += 1;
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Beacon client whose verbs return scripted results
///
/// Every verb succeeds until given an error to replay; call counts are
/// recorded per verb.
#[derive(Default)]
pub struct FakeBeaconClient {
    land: Mutex<VerbState>,
    retire: Mutex<VerbState>,
    delete: Mutex<VerbState>,
}

impl FakeBeaconClient {
    /// Create a fake whose verbs all succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `error` from every subsequent `land_worker` call
    pub fn fail_land_with(&self, error: GantryError) {
        self.land.lock().error = Some(error);
    }

    /// Replay `error` from every subsequent `retire_worker` call
    pub fn fail_retire_with(&self, error: GantryError) {
        self.retire.lock().error = Some(error);
    }

    /// Replay `error` from every subsequent `delete_worker` call
    pub fn fail_delete_with(&self, error: GantryError) {
        self.delete.lock().error = Some(error);
    }

    /// Number of `land_worker` calls so far
    pub fn land_calls(&self) -> u32 {
        self.land.lock().calls
    }

    /// Number of `retire_worker` calls so far
    pub fn retire_calls(&self) -> u32 {
        self.retire.lock().calls
    }

    /// Number of `delete_worker` calls so far
    pub fn delete_calls(&self) -> u32 {
        self.delete.lock().calls
    }
}

#[async_trait]
impl BeaconClient for FakeBeaconClient {
    async fn land_worker(&self) -> Result<()> {
        self.land.lock().record()
    }

    async fn retire_worker(&self) -> Result<()> {
        self.retire.lock().record()
    }

    async fn delete_worker(&self) -> Result<()> {
        self.delete.lock().record()
    }
}

enum ProbeScript {
    Always(bool),
    Failing(GantryError),
    RunningFor(u32),
}

/// Process probe with a scripted liveness answer
pub struct FakeWatchProcess {
    script: ProbeScript,
    probes: Mutex<u32>,
}

impl FakeWatchProcess {
    /// Probe that always reports the process running
    pub fn running() -> Self {
        Self::with_script(ProbeScript::Always(true))
    }

    /// Probe that always reports the process stopped
    pub fn stopped() -> Self {
        Self::with_script(ProbeScript::Always(false))
    }

    /// Probe that replays `error` on every call
    pub fn failing(error: GantryError) -> Self {
        Self::with_script(ProbeScript::Failing(error))
    }

    /// Probe that reports running for the first `n` calls, stopped after
    pub fn running_for(n: u32) -> Self {
        Self::with_script(ProbeScript::RunningFor(n))
    }

    fn with_script(script: ProbeScript) -> Self {
        Self {
            script,
            probes: Mutex::new(0),
        }
    }

    /// Number of probes so far
    pub fn probe_count(&self) -> u32 {
        *self.probes.lock()
    }
}

#[async_trait]
impl WatchProcess for FakeWatchProcess {
    async fn is_running(&self) -> Result<bool> {
        let mut probes = self.probes.lock();
        *probes += 1;
        match &self.script {
            ProbeScript::Always(running) => Ok(*running),
            ProbeScript::Failing(error) => Err(error.clone()),
            ProbeScript::RunningFor(n) => Ok(*probes <= *n),
        }
    }
}
