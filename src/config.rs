//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. explicit path (e.g. the CLI's `--config`)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//! 4. built-in defaults
//!
//! Every field has a default, so an empty file is a valid config.
//!
//! The API key is loaded separately with mandatory permission checks:
//! 1. `~/.huginn/secrets.toml` (user, must be 0600)
//! 2. `/etc/huginn/secrets.toml` (system, must be 0600)
//! 3. `GOOGLE_API_KEY` environment variable

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::providers::{GeminiConfig, RetryConfig};
use crate::rate_limit::RateLimitConfig;
use crate::{HuginnError, Result};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub gemini: GeminiSection,
}

/// Sliding-window rate limit.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Window length in seconds (default: 60).
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Admitted provider calls per window (default: 60).
    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests_per_window: default_max_requests(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> usize {
    60
}

/// Response cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry time-to-live in seconds (default: 3600).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of entries (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_entries() -> u64 {
    10_000
}

/// Retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 2).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in seconds (default: 4).
    #[serde(default = "default_backoff_min")]
    pub backoff_min_secs: u64,
    /// Backoff cap in seconds (default: 10).
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,
    /// Per-attempt timeout in seconds, 0 disables (default: 30).
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_min_secs: default_backoff_min(),
            backoff_max_secs: default_backoff_max(),
            attempt_timeout_secs: default_attempt_timeout(),
        }
    }
}

fn default_max_attempts() -> u32 {
    2
}

fn default_backoff_min() -> u64 {
    4
}

fn default_backoff_max() -> u64 {
    10
}

fn default_attempt_timeout() -> u64 {
    30
}

/// Gemini provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Ground generations with Google Search (default: true).
    #[serde(default = "default_search_grounding")]
    pub search_grounding: bool,
    /// HTTP timeout in seconds (default: 60).
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            embedding_model: default_embedding_model(),
            base_url: default_base_url(),
            search_grounding: default_search_grounding(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_model() -> String {
    crate::providers::gemini::DEFAULT_MODEL.to_string()
}

fn default_embedding_model() -> String {
    crate::providers::gemini::DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_base_url() -> String {
    crate::providers::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_search_grounding() -> bool {
    true
}

fn default_http_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error; when no path is
    /// given and no standard file exists, defaults are used.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::new()
            .window(Duration::from_secs(self.limits.window_secs))
            .max_requests(self.limits.max_requests_per_window)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .max_entries(self.cache.max_entries)
    }

    pub fn retry_config(&self) -> RetryConfig {
        let timeout = match self.retry.attempt_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        RetryConfig::new()
            .max_attempts(self.retry.max_attempts)
            .initial_delay(Duration::from_secs(self.retry.backoff_min_secs))
            .max_delay(Duration::from_secs(self.retry.backoff_max_secs))
            .attempt_timeout(timeout)
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new()
            .model(&self.gemini.model)
            .embedding_model(&self.gemini.embedding_model)
            .base_url(&self.gemini.base_url)
            .search_grounding(self.gemini.search_grounding)
            .timeout(Duration::from_secs(self.gemini.timeout_secs))
    }
}

/// Secrets file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".huginn").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/huginn/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Parse a secrets file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(HuginnError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Gemini API key from the secrets file, falling back to `GOOGLE_API_KEY`.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.limits.window_secs, 60);
        assert_eq!(config.limits.max_requests_per_window, 60);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.backoff_min_secs, 4);
        assert_eq!(config.retry.backoff_max_secs, 10);
        assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
        assert!(config.gemini.search_grounding);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.limits.max_requests_per_window, 60);
        assert_eq!(config.cache.max_entries, 10_000);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [limits]
            window_secs = 30
            max_requests_per_window = 10

            [cache]
            ttl_secs = 600
            max_entries = 500

            [retry]
            max_attempts = 3
            backoff_min_secs = 1
            backoff_max_secs = 5
            attempt_timeout_secs = 0

            [gemini]
            model = "gemini-2.0-flash"
            search_grounding = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        let limits = config.rate_limit_config();
        assert_eq!(limits.window, Duration::from_secs(30));
        assert_eq!(limits.max_requests, 10);

        let cache = config.cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(600));
        assert_eq!(cache.max_entries, 500);

        let retry = config.retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_secs(1));
        assert_eq!(retry.max_delay, Duration::from_secs(5));
        assert_eq!(retry.attempt_timeout, None);

        let gemini = config.gemini_config();
        assert_eq!(gemini.model, "gemini-2.0-flash");
        assert_eq!(gemini.embedding_model, "text-embedding-004");
        assert!(!gemini.search_grounding);
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [gemini]
            api_key = "AIza-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("AIza-test-key".to_string()));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/huginn.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
