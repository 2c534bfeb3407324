//! Huginn - a resilient gateway to a text-generation service
//!
//! [`Gateway`] sits between request handlers and an external model
//! (Google Gemini by default). It throttles outbound calls with a
//! sliding-window rate limiter, memoizes results in a TTL cache, retries
//! failures with exponential backoff, and degrades to a deterministic
//! fallback description when the model cannot be reached. Callers always
//! get text back.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use huginn::Huginn;
//! use huginn::types::prompt::{description_prompt, extract_description};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let gateway = Arc::new(Huginn::builder().gemini("your-google-api-key").build()?);
//!
//!     let text = gateway
//!         .generate(&description_prompt("Aaron Judge hits a home run"))
//!         .await;
//!
//!     println!("{}", extract_description(&text));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod rate_limit;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use config::{Config, Secrets};
pub use error::{HuginnError, Result};
pub use gateway::{FallbackSynthesizer, Gateway, Huginn, HuginnBuilder};
pub use providers::{GeminiClient, GeminiConfig, RetryConfig};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use types::{Embedding, FallbackReason, Generation, Outcome};
