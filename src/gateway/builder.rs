//! Builder for configuring gateway instances

use std::sync::Arc;

use super::Gateway;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::Config;
use crate::providers::{
    EmbeddingProvider, GeminiClient, GeminiConfig, GenerateProvider, RetryConfig,
    RetryingGenerateProvider,
};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::{HuginnError, Result};

/// Main entry point for creating gateway instances.
pub struct Huginn;

impl Huginn {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> HuginnBuilder {
        HuginnBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// ```rust,no_run
/// # use huginn::{Huginn, RateLimitConfig};
/// # fn main() -> huginn::Result<()> {
/// let gateway = Huginn::builder()
///     .gemini("your-google-api-key")
///     .rate_limit(RateLimitConfig::new().max_requests(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HuginnBuilder {
    gemini_key: Option<String>,
    gemini_config: GeminiConfig,
    provider: Option<Arc<dyn GenerateProvider>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    rate_limit: RateLimitConfig,
    cache: CacheConfig,
    retry: RetryConfig,
}

impl HuginnBuilder {
    pub fn new() -> Self {
        Self {
            gemini_key: None,
            gemini_config: GeminiConfig::default(),
            provider: None,
            embedder: None,
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Configure the Gemini provider for generation and embeddings.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_key = Some(api_key.into());
        self
    }

    /// Override Gemini model, endpoint and timeout settings.
    pub fn gemini_config(mut self, config: GeminiConfig) -> Self {
        self.gemini_config = config;
        self
    }

    /// Use a custom generation provider instead of Gemini.
    pub fn provider(mut self, provider: Arc<dyn GenerateProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a custom embedding provider instead of Gemini.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Set the sliding-window rate limit for provider calls.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Set response cache capacity and TTL.
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the retry policy for provider calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Apply every section of a loaded [`Config`].
    pub fn config(self, config: &Config) -> Self {
        self.rate_limit(config.rate_limit_config())
            .response_cache(config.cache_config())
            .retry(config.retry_config())
            .gemini_config(config.gemini_config())
    }

    /// Build the gateway.
    ///
    /// Fails with [`HuginnError::NoProvider`] when neither a Gemini key nor a
    /// custom provider was given, and with [`HuginnError::Configuration`] for
    /// settings that cannot work.
    pub fn build(self) -> Result<Gateway> {
        if self.retry.max_attempts == 0 {
            return Err(HuginnError::Configuration(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window.is_zero() {
            return Err(HuginnError::Configuration(
                "rate limit window must be longer than zero".to_string(),
            ));
        }

        let gemini = match self.gemini_key {
            Some(key) => Some(Arc::new(GeminiClient::with_config(
                key,
                self.gemini_config,
            )?)),
            None => None,
        };

        let provider: Arc<dyn GenerateProvider> = match (self.provider, &gemini) {
            (Some(provider), _) => provider,
            (None, Some(gemini)) => gemini.clone() as Arc<dyn GenerateProvider>,
            (None, None) => return Err(HuginnError::NoProvider),
        };

        let embedder: Option<Arc<dyn EmbeddingProvider>> = match (self.embedder, gemini) {
            (Some(embedder), _) => Some(embedder),
            (None, Some(gemini)) => Some(gemini as Arc<dyn EmbeddingProvider>),
            (None, None) => None,
        };

        Ok(Gateway::new(
            RetryingGenerateProvider::new(provider, self.retry),
            embedder,
            RateLimiter::new(&self.rate_limit),
            ResponseCache::new(&self.cache),
        ))
    }
}

impl Default for HuginnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
