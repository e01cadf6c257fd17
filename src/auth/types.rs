//! Auth configuration types

use serde::{Deserialize, Serialize};

/// Credentials sent with every Discogs request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Anonymous access (lower rate limit, no image URLs)
    #[default]
    None,

    /// Personal access token from the developer settings page
    Token {
        /// The token value
        token: String,
    },

    /// Application consumer key and secret
    KeySecret {
        /// Consumer key
        key: String,
        /// Consumer secret
        secret: String,
    },
}

impl AuthConfig {
    /// Create token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    /// Create key/secret credentials
    pub fn key_secret(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::KeySecret {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Whether any credentials are configured
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Value of the `Authorization` header, if any
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Token { token } => Some(format!("Discogs token={token}")),
            Self::KeySecret { key, secret } => {
                Some(format!("Discogs key={key}, secret={secret}"))
            }
        }
    }
}
