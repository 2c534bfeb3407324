//! Tests for [`RateLimiter`] - sliding-window admission.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use huginn::{RateLimitConfig, RateLimiter};
use tokio::time::advance;

fn limiter(max_requests: usize, window_secs: u64) -> RateLimiter {
    RateLimiter::new(
        &RateLimitConfig::new()
            .max_requests(max_requests)
            .window(Duration::from_secs(window_secs)),
    )
}

#[tokio::test(start_paused = true)]
async fn denies_calls_beyond_limit_within_window() {
    let limiter = limiter(3, 60);

    for _ in 0..3 {
        assert!(limiter.try_admit());
    }
    assert!(!limiter.try_admit());

    advance(Duration::from_secs(30)).await;
    assert!(!limiter.try_admit());
    assert_eq!(limiter.in_window(), 3);
}

#[tokio::test(start_paused = true)]
async fn admitted_call_expires_after_window() {
    let limiter = limiter(1, 60);
    assert!(limiter.try_admit());

    advance(Duration::from_secs(59)).await;
    assert!(!limiter.try_admit());

    advance(Duration::from_millis(1_001)).await;
    assert_eq!(limiter.in_window(), 0);
    assert!(limiter.try_admit());
}

#[tokio::test(start_paused = true)]
async fn window_slides_instead_of_resetting() {
    let limiter = limiter(2, 10);

    assert!(limiter.try_admit()); // t = 0
    advance(Duration::from_secs(9)).await;
    assert!(limiter.try_admit()); // t = 9

    advance(Duration::from_secs(2)).await; // t = 11, first call aged out
    assert!(limiter.try_admit());
    assert!(!limiter.try_admit()); // t = 9 and t = 11 still count

    advance(Duration::from_secs(8)).await; // t = 19, t = 9 aged out
    assert_eq!(limiter.in_window(), 1);
    assert!(limiter.try_admit());
}

#[tokio::test(start_paused = true)]
async fn denied_calls_are_not_recorded() {
    let limiter = limiter(1, 10);
    assert!(limiter.try_admit());

    // Hammering while full must not extend the window.
    for _ in 0..5 {
        advance(Duration::from_secs(1)).await;
        assert!(!limiter.try_admit());
    }

    advance(Duration::from_secs(5)).await; // t = 10
    assert!(limiter.try_admit());
}

#[test]
fn concurrent_callers_never_exceed_limit() {
    let limiter = Arc::new(limiter(10, 3600));
    let mut handles = Vec::new();

    for _ in 0..50 {
        let limiter = Arc::clone(&limiter);
        handles.push(thread::spawn(move || limiter.try_admit()));
    }

    let admitted = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .filter(|admitted| *admitted)
        .count();

    assert_eq!(admitted, 10);
    assert_eq!(limiter.in_window(), 10);
}
