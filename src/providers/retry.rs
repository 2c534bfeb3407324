//! Retry configuration, delay calculation, and the retrying decorator.
//!
//! [`RetryingGenerateProvider`] wraps any [`GenerateProvider`] with bounded
//! retries and exponential backoff. All retry logic lives in the shared
//! [`with_retry`] helper.
//!
//! Every error is retried until the attempt budget is spent; the final
//! failure is reported as [`HuginnError::RetriesExhausted`] carrying the
//! last error's message. Successful but empty text is passed through
//! untouched: whether empty output is acceptable is the caller's decision.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::traits::GenerateProvider;
use crate::telemetry;
use crate::{HuginnError, Result};

/// Configuration for retry behaviour.
///
/// Defaults: 2 attempts (one retry), backoff starting at 4s and doubling up
/// to 10s, 30s per-attempt timeout.
///
/// ```rust
/// # use huginn::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .initial_delay(Duration::from_secs(1))
///     .attempt_timeout(Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 2.
    pub max_attempts: u32,
    /// Delay before the first retry. Default: 4s.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 10s.
    pub max_delay: Duration,
    /// Upper bound for a single attempt. A timed-out attempt counts as a
    /// failure. `None` disables the bound. Default: 30s.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            attempt_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the per-attempt timeout.
    pub fn attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    ///
    /// Uses exponential backoff: `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

// ============================================================================
// Shared retry helper
// ============================================================================

/// Run `f` until it succeeds or the attempt budget is spent.
///
/// Runs `f` up to `config.max_attempts` times, sleeping
/// [`delay_for_attempt`](RetryConfig::delay_for_attempt) between attempts
/// (never before the first). Each attempt is bounded by
/// `config.attempt_timeout`.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    provider_name: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 0..max_attempts {
        let started = Instant::now();
        let outcome = match config.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, f()).await {
                Ok(result) => result,
                Err(_) => Err(HuginnError::Timeout(limit)),
            },
            None => f().await,
        };
        metrics::histogram!(telemetry::PROVIDER_DURATION_SECONDS,
            "provider" => provider_name.to_owned(),
        )
        .record(started.elapsed().as_secs_f64());

        let err = match outcome {
            Ok(result) => {
                debug!(provider = provider_name, attempt = attempt + 1, "attempt succeeded");
                return Ok(result);
            }
            Err(e) => e,
        };

        if attempt + 1 < max_attempts {
            metrics::counter!(telemetry::RETRIES_TOTAL,
                "provider" => provider_name.to_owned(),
            )
            .increment(1);
            let delay = config.delay_for_attempt(attempt);
            warn!(
                provider = provider_name,
                attempt = attempt + 1,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying after failed attempt"
            );
            tokio::time::sleep(delay).await;
        } else {
            warn!(
                provider = provider_name,
                attempt = attempt + 1,
                max_attempts,
                error = %err,
                "final attempt failed"
            );
        }
        last_err = Some(err);
    }

    Err(HuginnError::RetriesExhausted {
        attempts: max_attempts,
        message: last_err.map(|e| e.to_string()).unwrap_or_default(),
    })
}

// ============================================================================
// RetryingGenerateProvider
// ============================================================================

/// [`GenerateProvider`] decorator adding bounded retries with backoff.
///
/// Fails only with [`HuginnError::RetriesExhausted`]. It does not consult
/// any rate limiter: admission is decided once per gateway request, before
/// the first attempt.
pub struct RetryingGenerateProvider {
    inner: Arc<dyn GenerateProvider>,
    config: RetryConfig,
}

impl RetryingGenerateProvider {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: Arc<dyn GenerateProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The active retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[async_trait]
impl GenerateProvider for RetryingGenerateProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        with_retry(&self.config, self.inner.name(), || self.inner.generate(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_then_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(8));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(30), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let calls = std::sync::atomic::AtomicU32::new(0);
        let config = RetryConfig::new().max_attempts(0);
        let result: Result<()> = with_retry(&config, "test", || {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            async { Err(HuginnError::EmptyResponse) }
        })
        .await;

        assert!(matches!(
            result,
            Err(HuginnError::RetriesExhausted { attempts: 1, .. })
        ));
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out() {
        let config = RetryConfig::disabled().attempt_timeout(Some(Duration::from_secs(1)));
        let result: Result<()> = with_retry(&config, "test", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(HuginnError::RetriesExhausted { message, .. }) => {
                assert!(message.contains("timed out"), "message: {message}");
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
    }
}
