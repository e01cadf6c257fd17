//! Authentication module
//!
//! Supports: personal access token, consumer key/secret
//!
//! The `Authenticator` only applies credentials to outgoing requests.
//! Obtaining them (the OAuth handshake) is left to the caller.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
