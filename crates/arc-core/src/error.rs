//! Error types for Regional Controller operations.
//!
//! HTTP error statuses returned by the controller are *not* part of
//! this taxonomy: resource calls hand those back as an outcome. Only failures
//! that prevent a request/response exchange from completing, authentication
//! failures and client-side capability violations surface here.

use thiserror::Error;

/// Main error type for Regional Controller operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The request could not be delivered (connection refused, DNS, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The configured request timeout elapsed
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A response arrived but its body could not be read
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Login was rejected or did not yield a session token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The verb or option is not available for the resource type
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Regional Controller operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true when the request never completed at the transport level.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::ConfigError(_) | Self::AuthenticationFailed(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
