//! Request pacing for external providers.
//!
//! Limiters are injected into [`Throttled`](crate::fetch::Throttled) rather
//! than sleeping inline, so tests run without real delays.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits until the caller may issue its next request.
    async fn acquire(&self);
}

/// Never waits.
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// Spaces consecutive requests at least `interval` apart.
pub struct FixedInterval {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedInterval {
    async fn acquire(&self) {
        let mut next = self.next_slot.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }
        *next = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_spaces_calls() {
        let limiter = FixedInterval::new(Duration::from_millis(200));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert!(start.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_does_not_wait_after_idle_gap() {
        let limiter = FixedInterval::new(Duration::from_millis(200));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_unlimited_returns_immediately() {
        Unlimited.acquire().await;
    }
}
