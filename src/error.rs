//! Huginn error types

use std::time::Duration;

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Either the local sliding window denied the call or the provider
    /// answered HTTP 429.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Every attempt allowed by the retry policy failed.
    ///
    /// Carries the message of the last underlying failure.
    #[error("gave up after {attempts} attempt(s): {message}")]
    RetriesExhausted { attempts: u32, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response from model")]
    EmptyResponse,

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Whether this error came from the provider or the local limiter
    /// refusing the call for volume reasons.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HuginnError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for HuginnError {
    fn from(err: reqwest::Error) -> Self {
        HuginnError::Http(err.to_string())
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
