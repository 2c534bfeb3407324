//! Time-bounded cache of successful generations.
//!
//! [`ResponseCache`] maps a subject key (see
//! [`subject_key`](crate::types::prompt::subject_key)) to generated text.
//! An entry is valid only while its age is below the configured TTL; an
//! expired entry reads exactly like an absent one. Entries are never updated
//! in place: a new generation for the same key replaces the old one.
//!
//! # Architecture
//!
//! Backed by moka's async cache, owned per [`Gateway`](crate::Gateway)
//! instance. moka handles TTL expiry on read and bounds the entry count, so
//! memory stays flat in long-running processes without a sweeper task.
//!
//! # Concurrent misses
//!
//! [`ResponseCache::get_or_try_insert_with`] coalesces concurrent misses for
//! one key onto a single `init` future. Only a successful `init` populates
//! the cache; an error is handed to every waiter and nothing is stored.
//! Callers learn whether their own `init` ran, so a coalesced result can be
//! reported as cached rather than generated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::telemetry;

/// Capacity and expiry settings for [`ResponseCache`].
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Upper bound on stored subjects before moka starts evicting. Default: 10,000.
    pub max_entries: u64,
    /// Age at which an entry stops being served. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of stored subjects.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the entry lifetime.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// In-memory TTL cache of generated text, keyed on subject.
pub struct ResponseCache {
    cache: Cache<String, String>,
    ttl: Duration,
}

impl ResponseCache {
    /// Build an empty cache.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            cache,
            ttl: config.ttl,
        }
    }

    /// Look up a cached value.
    ///
    /// Returns `None` when the key was never cached and when its entry has
    /// expired; the two cases are indistinguishable. Emits hit/miss metrics.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Some(value) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(value)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert a value, replacing any previous entry for `key`.
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.cache.insert(key.into(), value.into()).await;
    }

    /// Return the cached value for `key`, or run `init` to produce it.
    ///
    /// Concurrent callers missing on the same key wait on a single `init`.
    /// On success the value is cached and returned to all of them; on error
    /// every waiter receives the shared error and the cache is untouched.
    ///
    /// The flag is `true` only for the caller whose own `init` produced the
    /// value. Waiters that joined an in-flight `init`, and callers that found
    /// an entry inserted after their last [`get`](Self::get), see `false`.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        key: &str,
        init: F,
    ) -> Result<(String, bool), Arc<E>>
    where
        F: Future<Output = Result<String, E>>,
        E: Send + Sync + 'static,
    {
        let entry = self.cache.entry_by_ref(key).or_try_insert_with(init).await?;
        let fresh = entry.is_fresh();
        Ok((entry.into_value(), fresh))
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live entries.
    ///
    /// Flushes moka's pending maintenance first so the count reflects every
    /// insert that has completed.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
