//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. Discogs
//! budgets requests per minute (60 authenticated, 25 anonymous), so the
//! quota is expressed per minute rather than per second.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per minute
    pub requests_per_minute: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::authenticated()
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_minute: u32, burst_size: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size,
        }
    }

    /// Discogs quota for authenticated requests
    pub fn authenticated() -> Self {
        Self {
            requests_per_minute: 60,
            burst_size: 5,
        }
    }

    /// Discogs quota for anonymous requests
    pub fn anonymous() -> Self {
        Self {
            requests_per_minute: 25,
            burst_size: 2,
        }
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.requests_per_minute, 60);
        assert_eq!(config.burst_size, 5);
    }

    #[test]
    fn test_rate_limiter_config_presets() {
        assert_eq!(RateLimiterConfig::anonymous().requests_per_minute, 25);
        assert_eq!(RateLimiterConfig::new(10, 3).burst_size, 3);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst_then_blocks() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(60, 3));

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        // One token per second refill; the bucket is empty right now
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait_blocks_once_burst_is_spent() {
        use std::time::Duration;

        let limiter = RateLimiter::new(&RateLimiterConfig::new(60, 1));
        let short = Duration::from_millis(50);

        assert!(tokio::time::timeout(short, limiter.wait()).await.is_ok());
        assert!(tokio::time::timeout(short, limiter.wait()).await.is_err());
    }

    #[test]
    fn test_zero_quota_falls_back_to_one() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
        assert!(limiter.try_acquire());
    }
}
