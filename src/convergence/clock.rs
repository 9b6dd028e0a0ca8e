//! Clock capability
//!
//! The convergence waiter and the credential updater read time only through
//! `Clock`, so a run can be driven by `ManualClock` without real waiting.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

pub trait Clock: Send + Sync {
    /// Monotonic time, for measuring elapsed durations
    fn now(&self) -> Instant;

    /// Wall-clock time, for timestamps written to external records
    fn utc_now(&self) -> DateTime<Utc>;

    /// Wall-clock time in whole seconds since the Unix epoch
    fn unix_seconds(&self) -> i64 {
        self.utc_now().timestamp()
    }

    /// Suspend the caller for `duration`
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Real time, sleeping on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

#[derive(Debug)]
struct ManualClockInner {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Simulated time. `sleep` returns immediately after advancing the clock.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    origin_utc: DateTime<Utc>,
    inner: Arc<Mutex<ManualClockInner>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Starts at 2023-11-14T22:13:20Z.
    pub fn new() -> Self {
        Self::starting_at(1_700_000_000)
    }

    pub fn starting_at(unix_seconds: i64) -> Self {
        Self {
            origin: Instant::now(),
            origin_utc: DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default(),
            inner: Arc::new(Mutex::new(ManualClockInner {
                elapsed: Duration::ZERO,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move time forward without sleeping.
    pub fn advance(&self, duration: Duration) {
        self.lock().elapsed += duration;
    }

    /// Simulated time since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_utc + offset
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        {
            let mut inner = self.lock();
            inner.elapsed += duration;
            inner.sleeps.push(duration);
        }
        futures_util::future::ready(()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_sleep_advances_time() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(30)).await;
        clock.sleep(Duration::from_secs(30)).await;

        assert_eq!(clock.now() - start, Duration::from_secs(60));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30); 2]);
        assert_eq!(clock.unix_seconds(), 1_700_000_060);
    }

    #[test]
    fn test_advance_moves_wall_clock() {
        let clock = ManualClock::starting_at(100);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.unix_seconds(), 105);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_system_clock_sleeps() {
        let clock = SystemClock;
        let start = clock.now();
        clock.sleep(Duration::from_millis(5)).await;
        assert!(clock.now() - start >= Duration::from_millis(5));
    }
}
