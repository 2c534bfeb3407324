//! Google Gemini REST client for text generation and embeddings.
//!
//! Talks to the `generateContent` and `embedContent` endpoints of the
//! Generative Language API.
//! See: <https://ai.google.dev/api/generate-content>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::traits::{EmbeddingProvider, GenerateProvider};
use crate::types::Embedding;
use crate::{HuginnError, Result};

/// Default base URL for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default text generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Configuration for [`GeminiClient`].
///
/// ```rust
/// # use huginn::providers::GeminiConfig;
/// let config = GeminiConfig::new()
///     .model("gemini-2.0-flash")
///     .search_grounding(false);
/// ```
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model used for `generateContent`. Default: `gemini-2.0-flash-exp`.
    pub model: String,
    /// Model used for `embedContent`. Default: `text-embedding-004`.
    pub embedding_model: String,
    /// API base URL (override for testing with wiremock).
    pub base_url: String,
    /// Attach the Google Search grounding tool to generation requests.
    /// Default: true.
    pub search_grounding: bool,
    /// HTTP client timeout. Default: 60s.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            search_grounding: true,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the Gemini API.
///
/// Supports:
/// - Text generation (optionally grounded with Google Search)
/// - Text embeddings
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client with default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            api_key: api_key.into(),
            http,
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Run a prompt through `generateContent`.
    ///
    /// Returns the concatenated text parts of the first candidate, or an
    /// empty string when the model produced none.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let tools = if self.config.search_grounding {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            tools,
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT"],
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, &self.config.model).await?;
        let body: GenerateContentResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        debug!(model = %self.config.model, chars = text.len(), "generateContent returned");
        Ok(text)
    }

    /// Embed a single text with `embedContent`.
    pub async fn embed_content(&self, text: &str) -> Result<Embedding> {
        let model = &self.config.embedding_model;
        let url = format!("{}/v1beta/models/{}:embedContent", self.config.base_url, model);

        let request = EmbedContentRequest {
            model: format!("models/{model}"),
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, model).await?;
        let body: EmbedContentResponse = response.json().await?;

        if body.embedding.values.is_empty() {
            return Err(HuginnError::EmptyResponse);
        }
        Ok(Embedding::new(body.embedding.values, model.as_str()))
    }
}

#[async_trait]
impl GenerateProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(name = "gemini.generate", skip(self, prompt), fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(name = "gemini.embed", skip(self, text), fields(model = %self.config.embedding_model))]
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.embed_content(text).await
    }
}

/// Map non-success statuses to [`HuginnError`], reading the API's error
/// message from the body when present.
async fn check_status(response: Response, model: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => Err(HuginnError::AuthenticationFailed),
        404 => Err(HuginnError::ModelNotFound(model.to_string())),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(HuginnError::RateLimited { retry_after })
        }
        code => {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("Gemini API error: {status}"),
            };
            Err(HuginnError::Api {
                status: code,
                message,
            })
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_grounding() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hi" }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT"],
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "tools": [{"google_search": {}}],
                "generationConfig": {"responseModalities": ["TEXT"]}
            })
        );
    }

    #[test]
    fn request_omits_empty_tools() {
        let request = GenerateContentRequest {
            contents: vec![],
            tools: vec![],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT"],
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
    }
}
