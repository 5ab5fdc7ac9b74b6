//! # Clock Abstraction
//!
//! Every simulated latency in the session goes through a [`Clock`], so the
//! same state machine runs on real timers in a binary and without any real
//! waiting in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Wall-clock time in milliseconds, used for wallet ids
    fn now_millis(&self) -> i64;

    /// Suspends the caller for a simulated latency
    async fn sleep(&self, duration: Duration);
}

/// Real time: chrono for timestamps, tokio timers for waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual time for tests. `sleep` advances the clock and yields once to
/// the scheduler instead of waiting, so concurrent callers still interleave
/// at every suspension point.
#[derive(Debug)]
pub struct InstantClock {
    now_ms: AtomicI64,
    slept_ms: AtomicU64,
    sleeps: AtomicU64,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::starting_at(1_700_000_000_000)
    }
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
            slept_ms: AtomicU64::new(0),
            sleeps: AtomicU64::new(0),
        }
    }

    /// Total simulated time spent in `sleep`
    pub fn total_slept(&self) -> Duration {
        Duration::from_millis(self.slept_ms.load(Ordering::SeqCst))
    }

    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }

    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clock for InstantClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.slept_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}
