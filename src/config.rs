//! Application configuration
//!
//! Loaded from YAML, with the Discogs token optionally taken from the
//! `DISCOGS_TOKEN` environment variable:
//!
//! ```yaml
//! base_url: https://api.discogs.com
//! user_agent: my-app/1.0 +https://example.com
//! credentials:
//!   type: token
//!   token: abcdef
//! http:
//!   timeout_seconds: 30
//!   max_retries: 3
//!   backoff: exponential
//!   rate_limit:
//!     requests_per_minute: 60
//!     burst_size: 5
//! pagination:
//!   per_page: 25
//!   stop_condition: empty_or_total_pages
//! ```

use crate::auth::AuthConfig;
use crate::collection::LoaderConfig;
use crate::discogs::{DiscogsClient, DEFAULT_BASE_URL, DEFAULT_PER_PAGE};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::pagination::{PageRequest, StopCondition};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding a personal access token
pub const TOKEN_ENV_VAR: &str = "DISCOGS_TOKEN";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Credentials
    #[serde(default)]
    pub credentials: AuthConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationSettings,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            credentials: AuthConfig::default(),
            http: HttpSettings::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy between retries
    #[serde(default)]
    pub backoff: BackoffType,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Request quota; derived from the credentials when unset
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    250
}

fn default_max_backoff() -> u64 {
    60_000
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            rate_limit: None,
        }
    }
}

// ============================================================================
// Pagination Settings
// ============================================================================

/// Pagination settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// When a collection counts as complete
    #[serde(default)]
    pub stop_condition: StopCondition,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            stop_condition: StopCondition::default(),
        }
    }
}

// ============================================================================
// Loading and conversion
// ============================================================================

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), "Loading config");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Use `token` as credentials when one is given
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.credentials = AuthConfig::token(token);
        }
        self
    }

    /// Apply the `DISCOGS_TOKEN` environment variable
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Check the configuration for values the API would reject
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)?;
        PageRequest::first(self.pagination.per_page)
            .validate()
            .map_err(|_| {
                Error::invalid_value(
                    "pagination.per_page",
                    format!("must be between 1 and 100, got {}", self.pagination.per_page),
                )
            })?;
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be positive"));
        }
        Ok(())
    }

    /// Request quota in effect
    pub fn rate_limit(&self) -> RateLimiterConfig {
        match &self.http.rate_limit {
            Some(limit) => limit.clone(),
            None if self.credentials.is_authenticated() => RateLimiterConfig::authenticated(),
            None => RateLimiterConfig::anonymous(),
        }
    }

    /// HTTP client configuration
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            )
            .rate_limit(self.rate_limit());
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Collection loader configuration
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::default().with_stop_condition(self.pagination.stop_condition)
    }

    /// Build an authenticated Discogs client
    pub fn build_client(&self) -> Result<DiscogsClient> {
        let http = HttpClient::with_auth(self.http_client_config(), self.credentials.clone())?;
        Ok(DiscogsClient::new(http))
    }
}
