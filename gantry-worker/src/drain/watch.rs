//! Process-liveness probing
//!
//! The drain loop gates its progress on a supervised local worker
//! process. [`WatchProcess`] is the probe seam; [`PidFileWatchProcess`]
//! is the production probe over the supervisor's pid file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{GantryError, Result};

/// Probe over the supervised worker process
///
/// Stateless from the caller's point of view; a probe may fail
/// transiently, and the drain loop treats any probe error as fatal.
#[async_trait]
pub trait WatchProcess: Send + Sync {
    /// Report whether the supervised process is still running
    async fn is_running(&self) -> Result<bool>;
}

/// Pid-file probe
///
/// The supervisor writes the worker's pid to a file on start and
/// removes the file when the process exits. An absent file therefore
/// reads as "not running"; an unreadable or malformed file is an error.
pub struct PidFileWatchProcess {
    pid_file: PathBuf,
}

impl PidFileWatchProcess {
    /// Create a probe over the given pid file
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
        }
    }

    fn path_str(&self) -> String {
        self.pid_file.display().to_string()
    }
}

#[async_trait]
impl WatchProcess for PidFileWatchProcess {
    async fn is_running(&self) -> Result<bool> {
        let content = match tokio::fs::read_to_string(&self.pid_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("pid file {} absent, process not running", self.path_str());
                return Ok(false);
            }
            Err(e) => {
                return Err(GantryError::PidFileUnreadable {
                    path: self.path_str(),
                    reason: e.to_string(),
                });
            }
        };

        let pid: u32 = content.trim().parse().map_err(|_| GantryError::PidFileMalformed {
            path: self.path_str(),
            content: content.clone(),
        })?;

        let alive = Path::new("/proc").join(pid.to_string()).exists();
        debug!("pid {} alive={}", pid, alive);
        Ok(alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_absent_pid_file_reads_as_stopped() {
        let dir = TempDir::new().unwrap();
        let probe = PidFileWatchProcess::new(dir.path().join("worker.pid"));
        assert_eq!(probe.is_running().await.unwrap(), false);
    }

    #[tokio::test]
    async fn test_own_pid_reads_as_running() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worker.pid");
        std::fs::write(&path, format!("{}\n", std::process::id())).unwrap();

        let probe = PidFileWatchProcess::new(path);
        assert_eq!(probe.is_running().await.unwrap(), true);
    }

    #[tokio::test]
    async fn test_stale_pid_reads_as_stopped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worker.pid");
        // pids wrap long before this value
        std::fs::write(&path, "4294967294").unwrap();

        let probe = PidFileWatchProcess::new(path);
        assert_eq!(probe.is_running().await.unwrap(), false);
    }

    #[tokio::test]
    async fn test_malformed_pid_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worker.pid");
        std::fs::write(&path, "not-a-pid").unwrap();

        let probe = PidFileWatchProcess::new(path);
        let err = probe.is_running().await.unwrap_err();
        assert!(matches!(err, GantryError::PidFileMalformed { .. }));
    }
}
