//! Worker drain control
//!
//! Drain state machine and process-liveness probing.

pub mod drainer;
pub mod watch;

pub use drainer::{DrainConfig, DrainMode, Drainer};
pub use watch::{PidFileWatchProcess, WatchProcess};
