use super::client::HttpClient;
use crate::throttle::RateLimiter;
use async_trait::async_trait;
use std::sync::Arc;

/// An [`HttpClient`] wrapper that waits on a [`RateLimiter`] before every
/// request.
pub struct Throttled<C> {
    inner: C,
    limiter: Arc<dyn RateLimiter>,
}

impl<C> Throttled<C> {
    pub fn new(inner: C, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for Throttled<C> {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.limiter.acquire().await;
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubHttp;
    use crate::throttle::FixedInterval;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_requests_wait_for_limiter() {
        let limiter = Arc::new(FixedInterval::new(Duration::from_millis(250)));
        let client = Throttled::new(StubHttp::new(200, "{}"), limiter);
        let start = Instant::now();

        for _ in 0..3 {
            let req = reqwest::Request::new(
                reqwest::Method::GET,
                "https://example.test/".parse().unwrap(),
            );
            client.execute(req).await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(client.inner.requests.lock().unwrap().len(), 3);
    }
}
