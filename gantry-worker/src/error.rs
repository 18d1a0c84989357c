//! Error types for Gantry workers
//!
//! Covers coordinator signaling, process probing, and configuration
//! errors. Errors cross module boundaries unchanged; the drain loop
//! branches on variant tags, never on message text.

use thiserror::Error;

/// Primary error type for all worker-side operations
#[derive(Debug, Clone, Error)]
pub enum GantryError {
    // ========== Coordinator Errors ==========

    /// No coordinator endpoint could be contacted. This is the
    /// unreachable sentinel: every configured endpoint failed at the
    /// transport level without a single completed exchange.
    #[error("failed to reach any coordinator endpoint")]
    Unreachable,

    /// The coordinator completed the exchange but refused the request
    #[error("coordinator rejected {verb} for worker {worker}: status {status}")]
    Rejected { verb: String, worker: String, status: u16 },

    /// A request failed for a reason other than transport reachability
    #[error("request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    // ========== Probe Errors ==========

    /// The worker pid file exists but could not be read
    #[error("failed to read pid file {path}: {reason}")]
    PidFileUnreadable { path: String, reason: String },

    /// The worker pid file does not contain a pid
    #[error("malformed pid file {path}: {content:?}")]
    PidFileMalformed { path: String, content: String },

    // ========== Configuration Errors ==========

    /// Invalid configuration supplied at construction
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl GantryError {
    /// Returns true if this is the unreachable-coordinator sentinel
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GantryError::Unreachable)
    }
}

/// Result type alias for worker-side operations
pub type Result<T> = std::result::Result<T, GantryError>;
