//! Outbound pacing.
//!
//! One limiter instance is shared by the whole process: scrape targets see
//! the *total* request rate, so throttling per source would still let the
//! combined volume trip anti-automation defenses. Holding the last-attempt
//! lock across the sleep also makes this the single point where processing
//! is serialized.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Time source used by the limiter. Production uses tokio time; tests swap in
/// a fake so pacing assertions run without wall-clock delay.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, dur: Duration);
}

pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

pub struct RateLimiter {
    min_interval: Duration,
    last_attempt: Mutex<Option<Instant>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, Arc::new(TokioClock))
    }

    pub fn with_clock(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            last_attempt: Mutex::new(None),
            clock,
        }
    }

    /// Block until at least `min_interval` has elapsed since the previous
    /// call anywhere in the process, then record this attempt.
    pub async fn wait_turn(&self) {
        let mut last = self.last_attempt.lock().await;
        if let Some(prev) = *last {
            let elapsed = self.clock.now().saturating_duration_since(prev);
            if elapsed < self.min_interval {
                self.clock.sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(self.clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Deterministic clock: `sleep` advances simulated time instead of
    /// waiting, and records each requested duration.
    struct FakeClock {
        base: Instant,
        offset: StdMutex<Duration>,
        slept: StdMutex<Vec<Duration>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: StdMutex::new(Duration::ZERO),
                slept: StdMutex::new(Vec::new()),
            }
        }

        fn advance(&self, dur: Duration) {
            *self.offset.lock().unwrap() += dur;
        }

        fn total_slept(&self) -> Duration {
            self.slept.lock().unwrap().iter().sum()
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock().unwrap()
        }

        async fn sleep(&self, dur: Duration) {
            self.slept.lock().unwrap().push(dur);
            self.advance(dur);
        }
    }

    #[tokio::test]
    async fn first_call_never_sleeps() {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::with_clock(Duration::from_secs(2), clock.clone());
        limiter.wait_turn().await;
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn back_to_back_calls_wait_out_the_full_interval() {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::with_clock(Duration::from_secs(2), clock.clone());
        limiter.wait_turn().await;
        limiter.wait_turn().await;
        assert_eq!(clock.total_slept(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn partially_elapsed_interval_only_pads_the_remainder() {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::with_clock(Duration::from_secs(2), clock.clone());
        limiter.wait_turn().await;
        clock.advance(Duration::from_millis(1500));
        limiter.wait_turn().await;
        assert_eq!(clock.total_slept(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn fully_elapsed_interval_passes_through() {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::with_clock(Duration::from_secs(2), clock.clone());
        limiter.wait_turn().await;
        clock.advance(Duration::from_secs(3));
        limiter.wait_turn().await;
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }
}
