//! Configuration structures for Regional Controller clients.
//!
//! [`RcClientConfig`] describes one controller: where it lives, how to log in,
//! and how the client should behave. It can be built in code with the `with_*`
//! methods or loaded from a YAML document.

use crate::client::DEFAULT_PORT;
use crate::types::{AcceptPreference, CapabilitySet, Scheme};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

/// Configuration for a Regional Controller client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RcClientConfig {
    /// Controller host. May embed a port as `host:port`, which then takes
    /// precedence over [`port`](Self::port).
    #[validate(length(min = 1))]
    pub server: String,

    /// Controller port
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit URL scheme; derived from the port when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,

    /// Login name used for lazy authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    /// Password used for lazy authentication
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Whether to verify TLS certificates.
    ///
    /// Off by default: controllers are commonly deployed with self-signed
    /// certificates. Turn it on (optionally with [`tls_ca_cert`](Self::tls_ca_cert))
    /// wherever the controller presents a verifiable chain.
    #[serde(default)]
    pub tls_verify: bool,

    /// Optional path to a PEM CA certificate to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds; requests never time out when unset
    #[validate(range(min = 1, max = 3600))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Initial `Accept` header ordering
    #[serde(default)]
    pub accept: AcceptPreference,

    /// Drop the token, log in again and re-issue the request once when a
    /// resource call answers 401
    #[serde(default)]
    pub reauthenticate_on_unauthorized: bool,

    /// Operations the target controller generation supports
    #[serde(default)]
    pub capabilities: CapabilitySet,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl RcClientConfig {
    /// Create a new client configuration for `server`.
    ///
    /// # Arguments
    ///
    /// * `server` - Controller host, optionally as `host:port`
    ///
    /// # Errors
    ///
    /// Returns an error if the server is empty or an embedded port is invalid.
    pub fn new(server: impl Into<String>) -> Result<Self> {
        Self {
            server: server.into(),
            ..Self::default()
        }
        .validated()
    }

    /// Parse a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration document: {e}")))?;

        config.validated()
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;

        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), server = %config.server, "Loaded controller configuration");
        Ok(config)
    }

    /// Set the port. Ignored when the server string embeds its own port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Force a URL scheme instead of deriving it from the port.
    #[must_use]
    pub const fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Set the credentials used for lazy authentication.
    #[must_use]
    pub fn with_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self.password = Some(password.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = Some(seconds);
        self
    }

    /// Set the initial `Accept` ordering.
    #[must_use]
    pub const fn with_accept(mut self, accept: AcceptPreference) -> Self {
        self.accept = accept;
        self
    }

    /// Enable or disable re-authentication on 401 responses.
    #[must_use]
    pub const fn with_reauthentication(mut self, enabled: bool) -> Self {
        self.reauthenticate_on_unauthorized = enabled;
        self
    }

    /// Set the capability set of the target controller.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Check field ranges and that the server resolves to an endpoint.
    ///
    /// Run this after changing fields directly.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range fields and a configuration
    /// error for an unusable server string.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        self.endpoint()?;
        Ok(self)
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Resolve host, port and scheme.
    ///
    /// The server string is split at its first `:`; anything after it must be a
    /// port number and overrides [`port`](Self::port). Bracketed IPv6 literals are
    /// not supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the port is not a number in `1..=65535`.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let (host, port) = match self.server.split_once(':') {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|e| {
                    Error::ConfigError(format!("Invalid port in server `{}`: {e}", self.server))
                })?;
                (host.trim(), port)
            }
            None => (self.server.trim(), self.port),
        };

        if host.is_empty() {
            return Err(Error::ConfigError(format!(
                "Missing host in server `{}`",
                self.server
            )));
        }
        if port == 0 {
            return Err(Error::ConfigError("Port 0 is not a valid port".to_string()));
        }

        Ok(Endpoint {
            host: host.to_string(),
            port,
            scheme: self.scheme.unwrap_or_else(|| Scheme::for_port(port)),
        })
    }
}

impl Default for RcClientConfig {
    fn default() -> Self {
        Self {
            server: crate::client::DEFAULT_SERVER.to_string(),
            port: default_port(),
            scheme: None,
            login: None,
            password: None,
            tls_verify: false,
            tls_ca_cert: None,
            request_timeout_secs: None,
            accept: AcceptPreference::default(),
            reauthenticate_on_unauthorized: false,
            capabilities: CapabilitySet::default(),
        }
    }
}

impl fmt::Debug for RcClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcClientConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls_verify", &self.tls_verify)
            .field("tls_ca_cert", &self.tls_ca_cert)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("accept", &self.accept)
            .field(
                "reauthenticate_on_unauthorized",
                &self.reauthenticate_on_unauthorized,
            )
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// A resolved controller location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// URL scheme
    pub scheme: Scheme,
}

impl Endpoint {
    /// Compose `{scheme}://{host}:{port}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not valid in a URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&format!("{}://{}:{}", self.scheme, self.host, self.port))
            .map_err(|e| Error::InvalidEndpoint(format!("Invalid controller host `{}`: {e}", self.host)))
    }
}
