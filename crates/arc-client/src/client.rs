//! Asynchronous Regional Controller client implementation.

use crate::Result;
use arc_core::client::{
    ClientConfig, API_PATH_SEGMENTS, CONTENT_TYPE_HEADER, FORCE_SEGMENT, TOKEN_HEADER,
};
use arc_core::{
    AcceptPreference, CapabilitySet, Endpoint, Error, MediaType, RcClientConfig, ResourceType,
    Scheme, Verb,
};
use reqwest::header::ACCEPT;
use reqwest::{Certificate, Client, ClientBuilder, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("arc-client/", env!("CARGO_PKG_VERSION"));

const LOGIN_SEGMENT: &str = "login";

/// Builder for [`RcClient`].
#[derive(Debug, Clone)]
pub struct RcClientBuilder {
    config: RcClientConfig,
    http_config: ClientConfig,
}

impl RcClientBuilder {
    /// Create a builder from a controller configuration.
    #[must_use]
    pub fn new(config: RcClientConfig) -> Self {
        let mut http_config = ClientConfig::new();
        if let Some(timeout) = config.timeout() {
            http_config = http_config.with_timeout(timeout);
        }

        Self {
            config,
            http_config,
        }
    }

    /// Override the HTTP client configuration.
    ///
    /// A configuration without a request timeout keeps the one taken from
    /// [`RcClientConfig::request_timeout_secs`].
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        let timeout = config.timeout.or(self.http_config.timeout);
        self.http_config = ClientConfig { timeout, ..config };
        self
    }

    /// Build the client.
    ///
    /// No request is sent; the session token is obtained by the first
    /// resource call.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid, the CA certificate cannot
    /// be loaded or the HTTP stack cannot be initialised.
    pub fn build(self) -> Result<RcClient> {
        let endpoint = self.config.endpoint()?;
        let base_url = endpoint.base_url()?;

        let mut builder = ClientBuilder::new().user_agent(USER_AGENT);

        if let Some(timeout) = self.http_config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.http_config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        if self.config.tls_verify {
            if let Some(path) = &self.config.tls_ca_cert {
                let pem = std::fs::read(path).map_err(|err| {
                    Error::ConfigError(format!(
                        "Failed to read controller CA certificate {}: {err}",
                        path.display()
                    ))
                })?;
                let certificate = Certificate::from_pem(&pem).map_err(|err| {
                    Error::ConfigError(format!("Invalid controller CA certificate: {err}"))
                })?;
                builder = builder.add_root_certificate(certificate);
            }
        } else {
            if endpoint.scheme == Scheme::Https {
                warn!(
                    host = %endpoint.host,
                    port = endpoint.port,
                    "TLS verification disabled for controller connection"
                );
            }
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build controller HTTP client: {err}"))
        })?;

        let password = self.config.password.map(SecretString::from);

        Ok(RcClient {
            http,
            endpoint,
            base_url,
            login: self.config.login,
            password,
            token: None,
            accept: self.config.accept,
            capabilities: self.config.capabilities,
            reauthenticate: self.config.reauthenticate_on_unauthorized,
            log_requests: self.http_config.enable_logging,
            last: None,
        })
    }
}

/// Status, reason and raw body of one controller response.
///
/// Any status counts as an outcome, including 4xx and 5xx. The body is
/// returned exactly as the controller sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    /// HTTP status code
    pub status: StatusCode,
    /// Canonical reason phrase for the status code (e.g. `Not Found`), not
    /// the text the controller put on its status line; empty for codes
    /// without a registered phrase
    pub reason: String,
    /// Response body text
    pub body: String,
}

impl OperationOutcome {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    async fn from_response(response: Response) -> Result<Self> {
        let status = response.status();
        // Timeouts while streaming the body stay transport errors.
        let body = response.text().await.map_err(Error::from)?;

        Ok(Self {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
    password: &'a str,
}

/// One resource request, kept around so it can be re-issued after a re-login.
struct PreparedRequest {
    method: Method,
    url: Url,
    resource: ResourceType,
    content_type: Option<MediaType>,
    body: Option<Vec<u8>>,
}

/// Session-token client for one Regional Controller.
///
/// The client lazily logs in on the first resource call and replays the
/// session token on every request after that. Operations take `&mut self`
/// because they update the token and the last recorded outcome.
#[derive(Debug)]
pub struct RcClient {
    http: Client,
    endpoint: Endpoint,
    base_url: Url,
    login: Option<String>,
    password: Option<SecretString>,
    token: Option<SecretString>,
    accept: AcceptPreference,
    capabilities: CapabilitySet,
    reauthenticate: bool,
    log_requests: bool,
    last: Option<OperationOutcome>,
}

impl RcClient {
    /// Construct a client for `server` with default settings and no credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if `server` is empty or embeds an invalid port.
    pub fn new(server: impl Into<String>) -> Result<Self> {
        RcClientBuilder::new(RcClientConfig::new(server)?).build()
    }

    /// Construct a client from a full configuration.
    ///
    /// # Errors
    ///
    /// See [`RcClientBuilder::build`].
    pub fn from_config(config: RcClientConfig) -> Result<Self> {
        RcClientBuilder::new(config).build()
    }

    /// Start a builder from a configuration.
    #[must_use]
    pub fn builder(config: RcClientConfig) -> RcClientBuilder {
        RcClientBuilder::new(config)
    }

    /// Controller host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    /// Controller port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    /// URL scheme fixed at construction.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.endpoint.scheme
    }

    /// Base URL, `{scheme}://{host}:{port}/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Prefer YAML responses. Affects only the `Accept` header of later calls.
    pub fn prefer_yaml(&mut self) {
        self.accept = AcceptPreference::YamlFirst;
    }

    /// Prefer JSON responses (the default).
    pub fn prefer_json(&mut self) {
        self.accept = AcceptPreference::JsonFirst;
    }

    /// Current `Accept` ordering.
    #[must_use]
    pub fn accept_preference(&self) -> AcceptPreference {
        self.accept
    }

    /// Capability set checked before every resource call.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Whether a session token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Drop the session token without contacting the controller.
    pub fn invalidate_token(&mut self) {
        self.token = None;
    }

    /// Outcome of the most recent resource call.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&OperationOutcome> {
        self.last.as_ref()
    }

    /// Status of the most recent resource call.
    #[must_use]
    pub fn last_status(&self) -> Option<StatusCode> {
        self.last.as_ref().map(|outcome| outcome.status)
    }

    /// Reason phrase of the most recent resource call.
    #[must_use]
    pub fn last_reason(&self) -> Option<&str> {
        self.last.as_ref().map(|outcome| outcome.reason.as_str())
    }

    /// Log in and store the session token.
    ///
    /// The credentials are remembered for later re-authentication. Any token
    /// held before the call is dropped first, so a failed login leaves the
    /// client unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] on a non-2xx status or when the
    /// response carries no usable token, and a transport error when the
    /// controller cannot be reached.
    pub async fn login(&mut self, login: &str, password: &str) -> Result<()> {
        self.login = Some(login.to_string());
        self.password = Some(SecretString::from(password.to_string()));
        self.authenticate().await
    }

    /// End the session.
    ///
    /// Sends `DELETE /api/v1/login` with the current token. The local token is
    /// cleared whatever the controller answers. Without a token this is a
    /// no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed; the token is
    /// cleared in that case too.
    pub async fn logout(&mut self) -> Result<Option<OperationOutcome>> {
        let Some(token) = self.token.take() else {
            return Ok(None);
        };

        let url = self.api_url(&[LOGIN_SEGMENT])?;
        info!(path = %url.path(), "Sending logout request");

        let response = self
            .http
            .delete(url)
            .header(ACCEPT, self.accept.header_value())
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await?;

        let outcome = OperationOutcome::from_response(response).await?;
        self.record(&outcome, "logout");
        Ok(Some(outcome))
    }

    /// List all objects of a type: `GET /api/v1/{type}`.
    ///
    /// # Errors
    ///
    /// Fails on capability violations, authentication failure or transport
    /// errors. Non-2xx statuses are returned as outcomes.
    pub async fn list(&mut self, resource: ResourceType) -> Result<OperationOutcome> {
        self.capabilities.check(resource, Verb::List)?;

        let request = PreparedRequest {
            method: Method::GET,
            url: self.api_url(&[resource.name()])?,
            resource,
            content_type: None,
            body: None,
        };
        self.execute(request).await
    }

    /// Create an object: `POST /api/v1/{type}`.
    ///
    /// `content` is encoded as JSON or YAML according to `content_type`.
    ///
    /// # Errors
    ///
    /// Fails on capability violations, encoding errors, authentication failure
    /// or transport errors.
    pub async fn create<T>(
        &mut self,
        resource: ResourceType,
        content: &T,
        content_type: MediaType,
    ) -> Result<OperationOutcome>
    where
        T: Serialize + ?Sized,
    {
        self.capabilities.check(resource, Verb::Create)?;

        let request = PreparedRequest {
            method: Method::POST,
            url: self.api_url(&[resource.name()])?,
            resource,
            content_type: Some(content_type),
            body: Some(encode_body(content, content_type)?),
        };
        self.execute(request).await
    }

    /// Show one object: `GET /api/v1/{type}/{id}`.
    ///
    /// # Errors
    ///
    /// Fails on capability violations, an empty id, authentication failure or
    /// transport errors.
    pub async fn show(
        &mut self,
        resource: ResourceType,
        id: &str,
        content_type: MediaType,
    ) -> Result<OperationOutcome> {
        self.capabilities.check(resource, Verb::Show)?;
        require_id(id)?;

        let request = PreparedRequest {
            method: Method::GET,
            url: self.api_url(&[resource.name(), id])?,
            resource,
            content_type: Some(content_type),
            body: None,
        };
        self.execute(request).await
    }

    /// Update one object: `PUT /api/v1/{type}/{id}[/{subresource}]`.
    ///
    /// # Errors
    ///
    /// Fails on capability violations (including a subresource on a type that
    /// has none), an empty id, encoding errors, authentication failure or
    /// transport errors.
    pub async fn update<T>(
        &mut self,
        resource: ResourceType,
        id: &str,
        content: &T,
        content_type: MediaType,
        subresource: Option<&str>,
    ) -> Result<OperationOutcome>
    where
        T: Serialize + ?Sized,
    {
        self.capabilities.check(resource, Verb::Update)?;
        require_id(id)?;

        let url = match subresource {
            Some(sub) => {
                self.capabilities.check_subresource(resource)?;
                if sub.is_empty() {
                    return Err(Error::InvalidRequest(
                        "Subresource name must not be empty".to_string(),
                    ));
                }
                self.api_url(&[resource.name(), id, sub])?
            }
            None => self.api_url(&[resource.name(), id])?,
        };

        let request = PreparedRequest {
            method: Method::PUT,
            url,
            resource,
            content_type: Some(content_type),
            body: Some(encode_body(content, content_type)?),
        };
        self.execute(request).await
    }

    /// Delete one object: `DELETE /api/v1/{type}/{id}[/force]`.
    ///
    /// # Errors
    ///
    /// Fails on capability violations (including `force` on a type without
    /// forced delete), an empty id, authentication failure or transport errors.
    pub async fn delete(
        &mut self,
        resource: ResourceType,
        id: &str,
        content_type: MediaType,
        force: bool,
    ) -> Result<OperationOutcome> {
        self.capabilities.check(resource, Verb::Delete)?;
        require_id(id)?;

        let url = if force {
            self.capabilities.check_force_delete(resource)?;
            self.api_url(&[resource.name(), id, FORCE_SEGMENT])?
        } else {
            self.api_url(&[resource.name(), id])?
        };

        let request = PreparedRequest {
            method: Method::DELETE,
            url,
            resource,
            content_type: Some(content_type),
            body: None,
        };
        self.execute(request).await
    }

    async fn execute(&mut self, request: PreparedRequest) -> Result<OperationOutcome> {
        self.ensure_authenticated().await?;

        let mut outcome = self.send(&request).await?;

        if outcome.status == StatusCode::UNAUTHORIZED && self.reauthenticate {
            warn!(
                resource = %request.resource,
                "Controller rejected session token, logging in again"
            );
            self.token = None;
            self.authenticate().await?;
            outcome = self.send(&request).await?;
        }

        self.record(&outcome, request.resource.name());
        Ok(outcome)
    }

    async fn send(&self, request: &PreparedRequest) -> Result<OperationOutcome> {
        let token = self.token.as_ref().ok_or_else(|| {
            Error::AuthenticationFailed("No session token available".to_string())
        })?;

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .header(ACCEPT, self.accept.header_value())
            .header(TOKEN_HEADER, token.expose_secret());

        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE_HEADER, content_type.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        if self.log_requests {
            info!(
                method = %request.method,
                path = %request.url.path(),
                resource = %request.resource,
                "Sending controller request"
            );
        }

        let response = builder.send().await?;
        OperationOutcome::from_response(response).await
    }

    /// Log in with the configured credentials unless a token is already held.
    ///
    /// Resource calls do this on their own; calling it up front only moves
    /// the login exchange earlier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when no credentials are
    /// configured or the controller refuses them.
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        if self.token.is_some() {
            return Ok(());
        }
        self.authenticate().await
    }

    async fn authenticate(&mut self) -> Result<()> {
        self.token = None;

        let (Some(login), Some(password)) = (self.login.as_deref(), self.password.as_ref()) else {
            return Err(Error::AuthenticationFailed(
                "No credentials configured for controller login".to_string(),
            ));
        };

        let url = self.api_url(&[LOGIN_SEGMENT])?;
        info!(user = %login, path = %url.path(), "Sending login request");

        let payload = LoginRequest {
            name: login,
            password: password.expose_secret(),
        };
        let response = self.http.post(url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::AuthenticationFailed(format!(
                "Login rejected with status {status}: {text}"
            )));
        }

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::AuthenticationFailed(format!(
                    "Login response carried no usable {TOKEN_HEADER} header"
                ))
            })?;

        self.token = Some(SecretString::from(token.to_string()));
        debug!(user = %login, "Stored controller session token");
        Ok(())
    }

    fn record(&mut self, outcome: &OperationOutcome, operation: &str) {
        if self.log_requests {
            if outcome.is_success() {
                info!(
                    operation,
                    status = outcome.status.as_u16(),
                    reason = %outcome.reason,
                    "Controller request completed"
                );
            } else {
                warn!(
                    operation,
                    status = outcome.status.as_u16(),
                    reason = %outcome.reason,
                    "Controller returned non-success status"
                );
            }
        }
        self.last = Some(outcome.clone());
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidEndpoint(format!("Controller URL `{}` cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(API_PATH_SEGMENTS)
            .extend(segments);
        Ok(url)
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidRequest(
            "Object identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn encode_body<T>(content: &T, content_type: MediaType) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    match content_type {
        MediaType::Json => Ok(serde_json::to_vec(content)?),
        MediaType::Yaml => Ok(serde_yaml::to_string(content)?.into_bytes()),
    }
}
