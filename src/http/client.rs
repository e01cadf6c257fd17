//! Discogs HTTP client
//!
//! GET requests with query parameters and JSON decoding. Server errors,
//! timeouts and refused connections are retried with backoff; 429 answers
//! wait out the Discogs one-minute window. The quota Discogs reports on
//! every response is kept for callers to inspect.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Wait applied to a 429 without a `Retry-After` header
const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Query parameters of one request
pub type Query<'a> = [(&'a str, String)];

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for request paths
    pub base_url: Option<String>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Extra attempts after the first one fails
    pub max_retries: u32,
    /// First backoff delay
    pub initial_backoff: Duration,
    /// Backoff ceiling
    pub max_backoff: Duration,
    /// How the delay grows between attempts
    pub backoff_type: BackoffType,
    /// Client-side request budget; `None` sends as fast as possible
    pub rate_limit: Option<RateLimiterConfig>,
    /// Discogs rejects requests without a user agent
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("discogs-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Delay before retry number `attempt + 1`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let steps = match self.backoff_type {
            BackoffType::Constant => 1,
            BackoffType::Linear => attempt.saturating_add(1),
            BackoffType::Exponential => 2u32.saturating_pow(attempt),
        };
        self.initial_backoff
            .saturating_mul(steps)
            .min(self.max_backoff)
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff strategy and bounds
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set the client-side request budget
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Send without a client-side budget
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Request budget Discogs reports in `X-Discogs-Ratelimit*` headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    /// Requests allowed per minute
    pub limit: u32,
    /// Requests made in the current window
    pub used: u32,
    /// Requests left in the current window
    pub remaining: u32,
}

impl QuotaStatus {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<u32> { headers.get(name)?.to_str().ok()?.parse().ok() };
        let limit = read("x-discogs-ratelimit")?;
        let remaining = read("x-discogs-ratelimit-remaining")?;
        Some(Self {
            limit,
            used: read("x-discogs-ratelimit-used").unwrap_or(limit.saturating_sub(remaining)),
            remaining,
        })
    }
}

/// Outcome of one failed attempt
enum Failure {
    /// Worth another attempt, after `wait` or the configured backoff
    Transient { error: Error, wait: Option<Duration> },
    /// Retrying cannot help
    Fatal(Error),
}

/// HTTP client for the Discogs API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
    quota: Mutex<Option<QuotaStatus>>,
}

impl HttpClient {
    /// Create an anonymous client
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Self::with_auth(config, AuthConfig::None)
    }

    /// Create a client that sends `auth` with every request
    pub fn with_auth(config: HttpClientConfig, auth: AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
            config,
            authenticator: Authenticator::new(auth),
            quota: Mutex::new(None),
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Quota reported on the most recent response, if Discogs sent one
    pub fn quota(&self) -> Option<QuotaStatus> {
        *self.quota.lock()
    }

    /// GET `path` and decode the JSON body
    ///
    /// A body that does not decode into `T` is an [`Error::Decode`], never
    /// a transport error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T> {
        let response = self.get(path, query).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::decode(format!("{path}: {e}")))
    }

    async fn get(&self, path: &str, query: &Query<'_>) -> Result<Response> {
        let url = self.url(path);
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let (error, wait) = match self.attempt(&url, query).await {
                Ok(response) => {
                    debug!(%url, attempt, "Request succeeded");
                    return Ok(response);
                }
                Err(Failure::Fatal(error)) => return Err(error),
                Err(Failure::Transient { error, wait }) => (error, wait),
            };

            if attempt >= max_retries {
                return Err(error);
            }
            let delay = wait.unwrap_or_else(|| self.config.backoff_delay(attempt));
            attempt += 1;
            warn!(
                %url,
                %error,
                attempt,
                max_retries,
                ?delay,
                "Retrying Discogs request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, url: &str, query: &Query<'_>) -> std::result::Result<Response, Failure> {
        if let Some(limiter) = &self.rate_limiter {
            if !limiter.try_acquire() {
                debug!("Client-side quota spent, waiting for a permit");
                limiter.wait().await;
            }
        }

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self
            .authenticator
            .apply(request)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        self.record_quota(response.headers());

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after(response.headers());
            return Err(Failure::Transient {
                error: Error::RateLimited {
                    retry_after_seconds: wait.as_secs(),
                },
                wait: Some(wait),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let error = Error::http_status(status.as_u16(), error_message(&body));
        if status.is_server_error() {
            Err(Failure::Transient { error, wait: None })
        } else {
            Err(Failure::Fatal(error))
        }
    }

    fn transport_failure(&self, error: reqwest::Error) -> Failure {
        if error.is_timeout() {
            Failure::Transient {
                error: Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                },
                wait: None,
            }
        } else if error.is_connect() {
            Failure::Transient {
                error: Error::Http(error),
                wait: None,
            }
        } else {
            Failure::Fatal(Error::Http(error))
        }
    }

    fn record_quota(&self, headers: &HeaderMap) {
        let Some(quota) = QuotaStatus::from_headers(headers) else {
            return;
        };
        if quota.remaining == 0 {
            warn!(limit = quota.limit, "Discogs quota used up for this minute");
        } else {
            debug!(remaining = quota.remaining, used = quota.used, "Discogs rate limit");
        }
        *self.quota.lock() = Some(quota);
    }

    fn url(&self, path: &str) -> String {
        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("authenticated", &self.authenticator.config().is_authenticated())
            .field("quota", &self.quota())
            .finish_non_exhaustive()
    }
}

/// `Retry-After` in seconds, or the full quota window
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map_or(QUOTA_WINDOW, Duration::from_secs)
}

/// Discogs error bodies look like `{"message": "Release not found."}`
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
