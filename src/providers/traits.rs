//! Seams between the gateway and the services it calls.
//!
//! Text generation and embeddings are separate traits so a backend can offer
//! either one. Decorators such as
//! [`RetryingGenerateProvider`](super::retry::RetryingGenerateProvider)
//! stay generic over any text-returning call, and the traits let tests
//! substitute mocks.

use async_trait::async_trait;

use crate::Result;
use crate::types::Embedding;

// ============================================================================
// Generate Provider
// ============================================================================

/// A backend that turns one prompt into text.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Short identifier used in logs and metric labels.
    fn name(&self) -> &str;

    /// Generate text for a prompt.
    ///
    /// Implementations return the provider's text as-is; deciding whether
    /// empty text is acceptable is the caller's job.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Embedding Provider
// ============================================================================

/// A backend that turns text into a dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}
