use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::time::Duration;

/// Spaces out successive requests to at most one per `interval`.
pub struct Pacer {
    limiter: DefaultDirectRateLimiter,
}

impl Pacer {
    /// `None` for a zero interval, meaning no pacing.
    pub fn new(interval: Duration) -> Option<Self> {
        Quota::with_period(interval).map(|quota| Self {
            limiter: RateLimiter::direct(quota),
        })
    }

    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}
