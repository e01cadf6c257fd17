//! HTTP access to the Discogs API
//!
//! - **Retries**: server errors, timeouts and refused connections, with
//!   constant, linear or exponential backoff
//! - **Quota**: a client-side token bucket (governor) plus the
//!   `X-Discogs-Ratelimit*` headers reported by the server
//! - **Credentials**: Discogs `Authorization` headers via the auth module

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, Query, QuotaStatus};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
