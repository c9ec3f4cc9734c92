//! HTTP client settings and wire constants.
//!
//! This module holds the fixed names of the controller's REST surface and the
//! transport-level knobs shared by clients. Every operation is exactly one
//! request/response exchange; nothing is retried.

use std::time::Duration;

/// Path segments of the versioned API root, `/api/v1/`.
pub const API_PATH_SEGMENTS: [&str; 2] = ["api", "v1"];

/// Request and response header carrying the session token.
pub const TOKEN_HEADER: &str = "X-ARC-Token";

/// Request header naming the body representation.
pub const CONTENT_TYPE_HEADER: &str = "Content-type";

/// JSON media type
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// YAML media type
pub const YAML_MEDIA_TYPE: &str = "application/yaml";

/// Trailing path segment that turns a delete into a forced delete.
pub const FORCE_SEGMENT: &str = "force";

/// Default controller port
pub const DEFAULT_PORT: u16 = 443;

/// Ports whose value modulo 1000 equals this are reached over TLS.
pub const TLS_PORT_CLASS: u16 = 443;

/// Default host when none is configured
pub const DEFAULT_SERVER: &str = "localhost";

/// HTTP client configuration.
///
/// Timeouts are unset by default: a request waits for the controller as long as
/// it takes. Setting one makes an expired request fail with
/// [`Error::Timeout`](crate::Error::Timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout
    pub timeout: Option<Duration>,

    /// Connection establishment timeout
    pub connect_timeout: Option<Duration>,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
