//! Worker drain binary
//!
//! Invoked by the node supervisor on shutdown or reconfigure to remove
//! this worker from the coordinator's active pool.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use gantry_worker::beacon::{BeaconConfig, HttpBeaconClient};
use gantry_worker::clock::SystemClock;
use gantry_worker::drain::PidFileWatchProcess;
use gantry_worker::{
    DrainConfig, DrainMode, Drainer, DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_PROBES_PER_CYCLE,
};

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mode = match std::env::var("GANTRY_DRAIN_MODE").as_deref() {
        Ok("retire") => DrainMode::Retire,
        Ok("land") | Err(_) => DrainMode::Land,
        Ok(other) => {
            error!("unknown drain mode {:?}, expected \"land\" or \"retire\"", other);
            std::process::exit(2);
        }
    };

    let endpoints: Vec<String> = std::env::var("GANTRY_COORDINATOR_ENDPOINTS")
        .unwrap_or_else(|_| "http://localhost:8080".into())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let worker_name = std::env::var("GANTRY_WORKER_NAME")
        .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

    let pid_file = std::env::var("GANTRY_PID_FILE")
        .unwrap_or_else(|_| "/var/run/gantry/worker.pid".into());

    let timeout = std::env::var("GANTRY_DRAIN_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs);

    let probes_per_cycle = std::env::var("GANTRY_PROBES_PER_CYCLE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROBES_PER_CYCLE);

    info!(
        "draining worker {} ({:?}) via {} coordinator endpoint(s)",
        worker_name,
        mode,
        endpoints.len()
    );

    let beacon_client = HttpBeaconClient::new(BeaconConfig {
        endpoints,
        worker_name,
        ..Default::default()
    })?;

    let drainer = Drainer::new(
        DrainConfig {
            mode,
            check_interval: env_secs("GANTRY_CHECK_INTERVAL_SECS", DEFAULT_CHECK_INTERVAL_SECS),
            probes_per_cycle,
            timeout,
        },
        Arc::new(PidFileWatchProcess::new(pid_file)),
        Arc::new(beacon_client),
        Arc::new(SystemClock),
    );

    match drainer.drain().await {
        Ok(()) => {
            info!("drain complete");
            Ok(())
        }
        Err(e) => {
            error!("drain failed: {}", e);
            Err(e.into())
        }
    }
}
