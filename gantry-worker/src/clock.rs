//! Time source abstraction
//!
//! The drain loop consumes time through the [`Clock`] trait so tests can
//! drive it deterministically. [`SystemClock`] wraps the monotonic clock;
//! [`TestClock`] is a manually advanced virtual clock whose sleepers park
//! until the test side moves time forward.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};

/// Abstract source of "now" and of bounded sleeps
#[async_trait]
pub trait Clock: Send + Sync {
    /// Return the current instant
    fn now(&self) -> Instant;

    /// Yield the caller until at least `d` of clock time has elapsed
    async fn sleep(&self, d: Duration);
}

/// System clock backed by `Instant::now` and the tokio timer
#[derive(Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

struct Sleeper {
    deadline: Duration,
    release: oneshot::Sender<()>,
}

struct TestClockInner {
    elapsed: Duration,
    sleepers: Vec<Sleeper>,
}

/// Manually advanced virtual clock
///
/// `sleep` parks the caller until `advance` moves virtual time past its
/// deadline. Time only moves when the test side calls `advance`, so a
/// task that is not parked can never observe the clock changing under
/// it. The rendezvous primitive `wait_for_sleeper` lets the test side
/// block until a sleeper is parked before advancing, which keeps
/// drive-the-loop tests fully deterministic.
pub struct TestClock {
    start: Instant,
    inner: Mutex<TestClockInner>,
    registered: Notify,
}

impl TestClock {
    /// Create a virtual clock at elapsed time zero
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            inner: Mutex::new(TestClockInner {
                elapsed: Duration::ZERO,
                sleepers: Vec::new(),
            }),
            registered: Notify::new(),
        }
    }

    /// Advance virtual time by `d`, releasing every sleeper whose
    /// deadline has arrived, in deadline order
    pub fn advance(&self, d: Duration) {
        let mut inner = self.inner.lock();
        inner.elapsed += d;
        let now = inner.elapsed;

        inner.sleepers.sort_by_key(|s| s.deadline);
        let mut parked = Vec::new();
        for sleeper in inner.sleepers.drain(..) {
            if sleeper.deadline <= now {
                let _ = sleeper.release.send(());
            } else {
                parked.push(sleeper);
            }
        }
        inner.sleepers = parked;
    }

    /// Number of currently parked sleepers
    pub fn sleeper_count(&self) -> usize {
        self.inner.lock().sleepers.len()
    }

    /// Complete once at least one sleeper is parked
    pub async fn wait_for_sleeper(&self) {
        loop {
            if !self.inner.lock().sleepers.is_empty() {
                return;
            }
            self.registered.notified().await;
        }
    }

    /// Wait until a sleeper is parked, then advance by `d`
    pub async fn wait_for_sleeper_and_advance(&self, d: Duration) {
        self.wait_for_sleeper().await;
        self.advance(d);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.start + self.inner.lock().elapsed
    }

    async fn sleep(&self, d: Duration) {
        let receiver = {
            let mut inner = self.inner.lock();
            let (release, receiver) = oneshot::channel();
            let deadline = inner.elapsed + d;
            inner.sleepers.push(Sleeper { deadline, release });
            receiver
        };
        // notify_one stores a permit, so a wait_for_sleeper call that
        // races this registration still observes it
        self.registered.notify_one();
        let _ = receiver.await;
    }
}
