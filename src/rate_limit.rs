//! Sliding-window rate limiting for outbound provider calls.
//!
//! [`RateLimiter`] keeps the timestamps of admitted calls for one trailing
//! window. Every admission check first evicts timestamps that have aged out,
//! then admits only if fewer than `max_requests` remain. Denial is immediate;
//! nothing queues or sleeps.
//!
//! Timestamps use [`tokio::time::Instant`] so tests can drive the window with
//! a paused clock.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::telemetry;

/// Configuration for the sliding-window rate limiter.
///
/// ```rust
/// # use huginn::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .window(Duration::from_secs(60))
///     .max_requests(60);
/// ```
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of the trailing window. Default: 60s.
    pub window: Duration,
    /// Maximum admitted calls inside any window. Default: 60.
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 60,
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window length.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the maximum number of admitted calls per window.
    pub fn max_requests(mut self, n: usize) -> Self {
        self.max_requests = n;
        self
    }
}

/// Thread-safe sliding-window counter.
///
/// Not a token bucket: bursts are bounded only by the count inside any
/// trailing window, they are not smoothed.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: config.window,
            max_requests: config.max_requests,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Try to admit one call now.
    ///
    /// Records the call and returns `true` when the window has room,
    /// otherwise returns `false` without recording anything.
    pub fn try_admit(&self) -> bool {
        let now = Instant::now();
        let mut admitted = self.lock();
        self.evict(&mut admitted, now);

        if admitted.len() >= self.max_requests {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            return false;
        }

        admitted.push_back(now);
        true
    }

    /// Number of admitted calls still inside the window.
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        let mut admitted = self.lock();
        self.evict(&mut admitted, now);
        admitted.len()
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Configured maximum calls per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    // Timestamps are pushed in order, so expired ones are always at the front.
    fn evict(&self, admitted: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = admitted.front() {
            if now.duration_since(oldest) < self.window {
                break;
            }
            admitted.pop_front();
        }
    }

    // Poisoning is ignored: every mutation leaves the queue ordered.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.admitted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}
