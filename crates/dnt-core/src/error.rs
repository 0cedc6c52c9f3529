use std::time::Duration;
use thiserror::Error;

/// Result type alias for DNT checker operations
pub type Result<T> = std::result::Result<T, DntError>;

/// Errors that can occur while checking DNT policies
#[derive(Error, Debug)]
pub enum DntError {
    /// The domain is empty or not a valid hostname
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Response body exceeded the configured limit
    #[error("response body too large: {size} bytes (limit {limit})")]
    BodyTooLarge {
        /// Observed or announced body size
        size: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Canonical policy text could not be loaded
    #[error("policy text error: {0}")]
    PolicyText(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DntError {
    /// Returns true if the error happened on the way to or from the remote host
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::Connection(_) | Self::BodyTooLarge { .. }
        )
    }
}
