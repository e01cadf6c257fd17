//! Authenticator implementation
//!
//! Applies configured credentials to request builders.

use super::types::AuthConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The credentials this authenticator applies
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.header_value() {
            Some(value) => req.header(AUTHORIZATION, value),
            None => req,
        }
    }
}
