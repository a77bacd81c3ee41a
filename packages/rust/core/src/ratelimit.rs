//! Minimum-spacing rate limiter for outbound collaborator calls.
//!
//! The external services are accessed synchronously, one record at a time,
//! so pacing the calls is what keeps a long run from tripping abuse
//! detection on the collaborator side. Each enricher owns its own limiter;
//! limiters for different collaborators never share clock state.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between consecutive `wait` calls.
pub struct RateLimiter {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    /// Create a limiter from a (non-negative) seconds value.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Suspend until at least `delay` has elapsed since the previous call
    /// to `wait` returned. The first call returns immediately.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_does_not_block() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_enforce_spacing() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        // N calls take at least (N-1) * delay.
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_never_blocks() {
        let limiter = RateLimiter::from_secs_f64(0.0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn limiters_do_not_share_clock_state() {
        let a = RateLimiter::new(Duration::from_millis(500));
        let b = RateLimiter::new(Duration::from_millis(500));

        a.wait().await;
        let start = Instant::now();
        // b's first call is free even though a has already been used.
        b.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
