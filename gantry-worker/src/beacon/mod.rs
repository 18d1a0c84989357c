//! Coordinator signaling
//!
//! The beacon is the worker's thin facade to the coordinator pool. It
//! exposes the three drain verbs; transport concerns (tunnels,
//! credentials) live behind the facade.

pub mod http;

pub use http::{BeaconConfig, HttpBeaconClient};

use async_trait::async_trait;

use crate::error::Result;

/// Wire-level facade to the coordinator
///
/// Each verb is fire-and-forget from the caller's perspective and
/// returns at most one error. The unreachable sentinel
/// ([`crate::GantryError::Unreachable`]) is returned when and only when
/// every known coordinator endpoint failed without a completed
/// exchange; all other failures are reported as ordinary errors.
#[async_trait]
pub trait BeaconClient: Send + Sync {
    /// Ask the coordinator to land this worker: stop scheduling new
    /// builds on it while in-flight builds finish
    async fn land_worker(&self) -> Result<()>;

    /// Ask the coordinator to retire this worker: remove it permanently
    async fn retire_worker(&self) -> Result<()>;

    /// Forcibly delete this worker from the coordinator's pool
    async fn delete_worker(&self) -> Result<()>;
}
