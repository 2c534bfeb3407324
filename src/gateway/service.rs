//! Gateway - cache, rate limit, retry and fallback around one provider

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::fallback::FallbackSynthesizer;
use crate::cache::ResponseCache;
use crate::providers::{EmbeddingProvider, GenerateProvider, RetryingGenerateProvider};
use crate::rate_limit::RateLimiter;
use crate::telemetry;
use crate::types::prompt::subject_key;
use crate::types::{Embedding, FallbackReason, Generation, Outcome};
use crate::{HuginnError, Result};

/// Characters of a prompt included in log lines.
const PROMPT_PREVIEW_CHARS: usize = 50;

/// Mediates calls to a text-generation provider.
///
/// Build one per process with [`Huginn::builder()`](crate::Huginn::builder)
/// and share it behind an `Arc`; the gateway owns its rate limiter and cache.
///
/// A request walks `cache → rate limit → provider (with retry)`. Anything
/// that goes wrong ends in a synthesized fallback, so
/// [`generate`](Self::generate) always returns usable text.
pub struct Gateway {
    invoker: RetryingGenerateProvider,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    limiter: RateLimiter,
    cache: ResponseCache,
    fallback: FallbackSynthesizer,
}

impl Gateway {
    pub(crate) fn new(
        invoker: RetryingGenerateProvider,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        limiter: RateLimiter,
        cache: ResponseCache,
    ) -> Self {
        Self {
            invoker,
            embedder,
            limiter,
            cache,
            fallback: FallbackSynthesizer,
        }
    }

    /// Generate text for `prompt`. Never fails.
    pub async fn generate(&self, prompt: &str) -> String {
        self.generate_detailed(prompt).await.text
    }

    /// Generate text for `prompt`, reporting which path produced it.
    ///
    /// Prompts with a subject (see [`subject_key`]) are served from the
    /// cache when possible and cache their successful results. Prompts
    /// without one always go to the provider and fall back to a generic
    /// message.
    pub async fn generate_detailed(&self, prompt: &str) -> Generation {
        debug!(
            provider = self.invoker.name(),
            prompt = %preview(prompt),
            "running prompt"
        );

        let generation = match subject_key(prompt) {
            Some(key) => self.generate_keyed(&key, prompt).await,
            None => match self.invoke(prompt).await {
                Ok(text) => Generation {
                    text,
                    outcome: Outcome::Generated,
                },
                Err(reason) => self.fall_back(None, reason),
            },
        };

        metrics::counter!(telemetry::REQUESTS_TOTAL, "outcome" => generation.outcome.as_str())
            .increment(1);
        generation
    }

    async fn generate_keyed(&self, key: &str, prompt: &str) -> Generation {
        if let Some(text) = self.cache.get(key).await {
            debug!(subject = key, "using cached description");
            return Generation {
                text,
                outcome: Outcome::Cached,
            };
        }

        // Concurrent misses on one subject share a single admission and call.
        match self
            .cache
            .get_or_try_insert_with(key, self.invoke(prompt))
            .await
        {
            Ok((text, true)) => Generation {
                text,
                outcome: Outcome::Generated,
            },
            // Joined another task's call, or it landed after our lookup.
            Ok((text, false)) => {
                debug!(subject = key, "using description produced by a concurrent request");
                Generation {
                    text,
                    outcome: Outcome::Cached,
                }
            }
            Err(reason) => self.fall_back(Some(key), *reason),
        }
    }

    /// One admitted provider call. The limiter is consulted exactly once,
    /// before any attempt; retries never consume further slots.
    async fn invoke(&self, prompt: &str) -> std::result::Result<String, FallbackReason> {
        if !self.limiter.try_admit() {
            warn!(
                in_window = self.limiter.in_window(),
                max_requests = self.limiter.max_requests(),
                "rate limit exceeded, using fallback"
            );
            return Err(FallbackReason::RateLimited);
        }

        match self.invoker.generate(prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    error!(provider = self.invoker.name(), "empty result from provider");
                    return Err(FallbackReason::Empty);
                }
                Ok(text.to_string())
            }
            Err(e) => {
                error!(provider = self.invoker.name(), error = %e, "provider call failed");
                Err(FallbackReason::Exhausted)
            }
        }
    }

    fn fall_back(&self, subject: Option<&str>, reason: FallbackReason) -> Generation {
        metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => reason.as_str()).increment(1);
        let text = match subject {
            Some(subject) => self.fallback.synthesize(subject),
            None => self.fallback.generic(),
        };
        Generation {
            text,
            outcome: Outcome::Fallback(reason),
        }
    }

    /// Embed `text` with the configured embedding provider.
    ///
    /// Embeddings bypass the cache and the rate limiter.
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let embedder = self.embedder.as_ref().ok_or(HuginnError::NoProvider)?;
        embedder.embed(text).await.inspect_err(|e| {
            error!(provider = embedder.name(), error = %e, "embedding failed");
        })
    }

    /// The gateway's rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The gateway's response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Name of the wrapped generation provider.
    pub fn provider_name(&self) -> &str {
        self.invoker.name()
    }
}

fn preview(prompt: &str) -> String {
    let mut preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    if prompt.chars().nth(PROMPT_PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}
