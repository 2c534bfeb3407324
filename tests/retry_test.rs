use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use huginn::providers::retry::{RetryConfig, RetryingGenerateProvider};
use huginn::providers::traits::GenerateProvider;
use huginn::{HuginnError, Result};
use tokio::time::Instant;

/// Mock provider that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    total_calls: AtomicU32,
    reply: &'static str,
}

impl FailThenSucceed {
    fn new(failures: u32) -> Self {
        Self::replying(failures, "ok")
    }

    fn replying(failures: u32, reply: &'static str) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            total_calls: AtomicU32::new(0),
            reply,
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerateProvider for FailThenSucceed {
    fn name(&self) -> &str {
        "mock-retry"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err(HuginnError::Api {
                status: 503,
                message: "model overloaded".into(),
            });
        }
        Ok(self.reply.to_string())
    }
}

/// Mock provider that never answers within any reasonable time.
struct Hangs {
    total_calls: AtomicU32,
}

#[async_trait]
impl GenerateProvider for Hangs {
    fn name(&self) -> &str {
        "mock-hang"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_two_attempts_with_backoff() {
    let inner = Arc::new(FailThenSucceed::new(10));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::default());

    let start = Instant::now();
    let result = provider.generate("prompt").await;
    let elapsed = start.elapsed();

    match result {
        Err(HuginnError::RetriesExhausted { attempts, message }) => {
            assert_eq!(attempts, 2);
            assert!(message.contains("model overloaded"), "message: {message}");
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    assert_eq!(inner.call_count(), 2);
    assert!(elapsed >= Duration::from_secs(4));
    assert!(elapsed < Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn retries_then_succeeds() {
    let inner = Arc::new(FailThenSucceed::new(1));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::default());

    let result = provider.generate("prompt").await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn no_delay_before_first_attempt() {
    let inner = Arc::new(FailThenSucceed::new(0));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::default());

    let start = Instant::now();
    let result = provider.generate("prompt").await;

    assert!(result.is_ok());
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_doubles_between_attempts() {
    let inner = Arc::new(FailThenSucceed::new(10));
    let provider =
        RetryingGenerateProvider::new(inner.clone(), RetryConfig::new().max_attempts(4));

    let start = Instant::now();
    let result = provider.generate("prompt").await;

    assert!(matches!(
        result,
        Err(HuginnError::RetriesExhausted { attempts: 4, .. })
    ));
    assert_eq!(inner.call_count(), 4);
    // 4s + 8s + 10s (capped)
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(22) && elapsed < Duration::from_secs(23));
}

#[tokio::test(start_paused = true)]
async fn empty_result_is_not_retried() {
    let inner = Arc::new(FailThenSucceed::replying(0, "   "));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::default());

    let result = provider.generate("prompt").await;

    assert_eq!(result.unwrap(), "   ");
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempt_counts_as_failure() {
    let inner = Arc::new(Hangs {
        total_calls: AtomicU32::new(0),
    });
    let provider = RetryingGenerateProvider::new(
        inner.clone(),
        RetryConfig::new().attempt_timeout(Some(Duration::from_secs(30))),
    );

    let start = Instant::now();
    let result = provider.generate("prompt").await;

    match result {
        Err(HuginnError::RetriesExhausted { attempts, message }) => {
            assert_eq!(attempts, 2);
            assert!(message.contains("timed out"), "message: {message}");
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    assert_eq!(inner.total_calls.load(Ordering::Relaxed), 2);
    // 30s + 4s backoff + 30s
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(64) && elapsed < Duration::from_secs(65));
}

#[tokio::test(start_paused = true)]
async fn disabled_config_no_retry() {
    let inner = Arc::new(FailThenSucceed::new(1));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::disabled());

    let result = provider.generate("prompt").await;

    assert!(result.is_err());
    assert_eq!(inner.call_count(), 1);
}

#[test]
fn retry_config_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.initial_delay, Duration::from_secs(4));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.attempt_timeout, Some(Duration::from_secs(30)));
}
