//! Authenticated request dispatcher.
//!
//! # Design
//! `ApiClient` owns immutable `Credentials`, the `AuthStrategy` chosen for
//! them at construction, and a `Transport`. Every public call builds an
//! `HttpRequest`, authenticates it, performs one round trip and hands the raw
//! status and body to `response::parse`. Nothing is retried.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::{self, AuthStrategy};
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, SignedRequest, CONTENT_TYPE_JSON, CONTENT_TYPE_YAML};
use crate::response;
use crate::transport::{Transport, UreqTransport};

const HEALTH_PATH: &str = "/health/status";
const TOKEN_PATH: &str = "/token";

/// Blocking client that signs and sends API requests.
///
/// `ApiClient` is `Send + Sync`; concurrent calls share only the immutable
/// credentials.
pub struct ApiClient {
    credentials: Credentials,
    auth: Box<dyn AuthStrategy>,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(credentials: Credentials) -> Self {
        let transport = UreqTransport::new(credentials.endpoint());
        Self::with_transport(credentials, transport)
    }

    pub fn with_transport(credentials: Credentials, transport: impl Transport + 'static) -> Self {
        let auth = auth::strategy_for(credentials.method());
        Self {
            credentials,
            auth,
            transport: Box::new(transport),
        }
    }

    /// Use an explicit strategy, e.g. `HmacAuth` with a fixed clock.
    ///
    /// Fails if the strategy does not implement the credentials' method.
    pub fn with_strategy(
        credentials: Credentials,
        auth: Box<dyn AuthStrategy>,
        transport: impl Transport + 'static,
    ) -> Result<Self, ApiError> {
        if auth.method() != credentials.method() {
            return Err(ApiError::InvalidCredentials(format!(
                "{} strategy cannot serve {} credentials",
                auth.method().as_str(),
                credentials.method().as_str()
            )));
        }
        Ok(Self {
            credentials,
            auth,
            transport: Box::new(transport),
        })
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(Credentials::try_from(config)?))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url(&self, path: &str) -> Result<String, ApiError> {
        self.credentials.endpoint().url(path).map(String::from)
    }

    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(HttpRequest::new(HttpMethod::Get, path))
    }

    /// POST a body that is already serialized.
    pub fn raw_post(&self, path: &str, body: String, content_type: &str) -> Result<Value, ApiError> {
        self.execute(HttpRequest::new(HttpMethod::Post, path).with_body(content_type, body))
    }

    pub fn json_post<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<Value, ApiError> {
        self.raw_post(path, to_json(data)?, CONTENT_TYPE_JSON)
    }

    pub fn yaml_post<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<Value, ApiError> {
        let yaml = serde_yaml::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.raw_post(path, yaml, CONTENT_TYPE_YAML)
    }

    pub fn json_put<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<Value, ApiError> {
        let request = HttpRequest::new(HttpMethod::Put, path).with_body(CONTENT_TYPE_JSON, to_json(data)?);
        self.execute(request)
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(HttpRequest::new(HttpMethod::Delete, path))
    }

    /// `true` when the health endpoint answers 200. The body is ignored.
    pub fn health_ping(&self) -> Result<bool, ApiError> {
        let (url, signed) = self.prepare(HttpRequest::new(HttpMethod::Get, HEALTH_PATH))?;
        let response = self.transport.send(url.as_str(), &signed)?;
        Ok(response.status == 200)
    }

    /// Request an API token, passing `claims` as the JSON body.
    pub fn token_get<T: Serialize + ?Sized>(&self, claims: &T) -> Result<Value, ApiError> {
        self.json_post(TOKEN_PATH, claims)
    }

    /// Run the configured auth strategy over `request`.
    pub fn authenticate(&self, request: HttpRequest) -> Result<SignedRequest, ApiError> {
        self.auth.authenticate(request, &self.credentials)
    }

    /// Authenticate, send and parse one request.
    pub fn execute(&self, request: HttpRequest) -> Result<Value, ApiError> {
        request.method.ensure_supported()?;
        let (url, signed) = self.prepare(request)?;
        debug!(
            method = %signed.request.method,
            %url,
            auth = self.credentials.method().as_str(),
            "dispatching request"
        );
        let response = self.transport.send(url.as_str(), &signed)?;
        response::parse_response(&response)
    }

    /// Resolve the URL, then authenticate the path exactly as it goes on the wire.
    fn prepare(&self, mut request: HttpRequest) -> Result<(Url, SignedRequest), ApiError> {
        let url = self.credentials.endpoint().url(&request.path)?;
        request.path = request_target(&url);
        let signed = self.authenticate(request)?;
        Ok((url, signed))
    }
}

/// Encoded path plus query, as sent in the request line.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String, ApiError> {
    serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))
}
