//! Provider clients and decorators.
//!
//! - [`traits`]: capability traits ([`GenerateProvider`], [`EmbeddingProvider`])
//! - [`retry`]: [`RetryingGenerateProvider`], bounded retries with backoff
//! - [`gemini`]: [`GeminiClient`], the Google Gemini REST client

pub mod gemini;
pub mod retry;
pub mod traits;

pub use gemini::{GeminiClient, GeminiConfig};
pub use retry::{RetryConfig, RetryingGenerateProvider};
pub use traits::{EmbeddingProvider, GenerateProvider};
