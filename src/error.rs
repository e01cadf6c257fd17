//! Error types for discogs-pager
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into three families that callers usually care about:
//! transport failures (`is_transport`), malformed responses (`is_decode`)
//! and caller mistakes such as `NotStarted` or bad configuration. An empty
//! page is not an error; the collection loader reports it as
//! [`LoadOutcome::Exhausted`](crate::collection::LoadOutcome::Exhausted).

use thiserror::Error;

/// The main error type for discogs-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration
    // ============================================================================
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid YAML config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Talking to Discogs
    // ============================================================================
    #[error("Request to Discogs failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the `message` field of the
    /// Discogs error body when there is one
    #[error("Discogs returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Discogs request quota exhausted, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No response from Discogs within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Unexpected response body: {message}")]
    Decode { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // Collection
    // ============================================================================
    #[error("No collection has been started; call start() first")]
    NotStarted,

    /// Another error with a note on what was being done
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Network or server failure while fetching a page
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(_)
            | Self::HttpStatus { .. }
            | Self::RateLimited { .. }
            | Self::Timeout { .. } => true,
            Self::Context { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// The server answered but the body could not be understood
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Decode { .. } => true,
            Self::Context { source, .. } => source.is_decode(),
            _ => false,
        }
    }
}

/// Result type alias for discogs-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Attach a description of the failed operation to an error
pub trait ResultExt<T> {
    /// Wrap the error in [`Error::Context`], building the note lazily
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}
