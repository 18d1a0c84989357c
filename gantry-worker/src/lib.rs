//! Gantry Worker - drain control for CI build workers
//!
//! This crate provides the worker-side runtime for removing a worker
//! from the coordinator's active pool:
//! - Graceful landing (stop accepting new builds) and retirement
//! - Timeout-driven escalation to forcible deletion
//! - Process-liveness gating of the drain loop
//! - Deterministic clock abstraction for testing

pub mod beacon;
pub mod clock;
pub mod drain;
pub mod error;
pub mod fakes;

pub use drain::{DrainConfig, DrainMode, Drainer};
pub use error::GantryError;

/// Default interval between process-liveness probes, in seconds
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 10;

/// Default number of liveness probes per drain cycle
pub const DEFAULT_PROBES_PER_CYCLE: u32 = 5;

/// Default coordinator connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default coordinator request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
