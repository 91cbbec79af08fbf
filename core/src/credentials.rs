//! Credentials and endpoint configuration.
//!
//! # Design
//! A `Credentials` value is validated once, at construction, and is immutable
//! afterwards. Only the fields the selected `AuthMethod` needs are kept; the
//! rest are dropped so an HMAC client never carries a stray password around.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;

/// Authentication scheme used for every request of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    None,
    Basic,
    Hmac,
    Token,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::Basic => "basic",
            AuthMethod::Hmac => "hmac",
            AuthMethod::Token => "token",
        }
    }
}

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// Accept any server certificate. Only honored when `tls` is set.
    pub skip_tls_verify: bool,
}

impl Endpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            tls: false,
            skip_tls_verify: false,
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    /// Full URI for an absolute request path.
    ///
    /// Characters not allowed in a path or query (spaces, quotes, ...) are
    /// percent-encoded. Default ports are omitted from the serialized form.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let sep = if path.starts_with('/') { "" } else { "/" };
        let raw = format!("{}://{}:{}{sep}{path}", self.scheme(), self.host, self.port);
        let url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if url.fragment().is_some() {
            return Err(ApiError::InvalidUrl(format!("{raw}: fragments are not sent")));
        }
        Ok(url)
    }
}

/// Validated, immutable authentication material for one client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    endpoint: Endpoint,
    method: AuthMethod,
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    token: Option<String>,
}

impl Credentials {
    pub fn builder(endpoint: Endpoint, method: AuthMethod) -> CredentialsBuilder {
        CredentialsBuilder {
            endpoint,
            method,
            username: None,
            password: None,
            secret: None,
            token: None,
        }
    }

    /// Unauthenticated access; never fails beyond endpoint validation.
    pub fn none(endpoint: Endpoint) -> Result<Self, ApiError> {
        Self::builder(endpoint, AuthMethod::None).build()
    }

    pub fn basic(endpoint: Endpoint, username: &str, password: &str) -> Result<Self, ApiError> {
        Self::builder(endpoint, AuthMethod::Basic)
            .username(username)
            .password(password)
            .build()
    }

    pub fn hmac(endpoint: Endpoint, username: &str, secret: &str) -> Result<Self, ApiError> {
        Self::builder(endpoint, AuthMethod::Hmac)
            .username(username)
            .secret(secret)
            .build()
    }

    pub fn token(endpoint: Endpoint, username: &str, token: &str) -> Result<Self, ApiError> {
        Self::builder(endpoint, AuthMethod::Token)
            .username(username)
            .token(token)
            .build()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("secret", &redact(&self.secret))
            .field("token", &redact(&self.token))
            .finish()
    }
}

/// Collects credential fields before validation.
#[derive(Debug, Clone)]
pub struct CredentialsBuilder {
    endpoint: Endpoint,
    method: AuthMethod,
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    token: Option<String>,
}

impl CredentialsBuilder {
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Validate and keep only the fields `method` needs.
    pub fn build(self) -> Result<Credentials, ApiError> {
        if self.endpoint.host.trim().is_empty() {
            return Err(ApiError::InvalidCredentials(
                "endpoint host is empty".to_string(),
            ));
        }

        let method = self.method;
        let mut creds = Credentials {
            endpoint: self.endpoint,
            method,
            username: None,
            password: None,
            secret: None,
            token: None,
        };

        match method {
            AuthMethod::None => {}
            AuthMethod::Basic => {
                creds.username = Some(required(method, "username", self.username)?);
                creds.password = Some(required(method, "password", self.password)?);
            }
            AuthMethod::Hmac => {
                creds.username = Some(required(method, "username", self.username)?);
                creds.secret = Some(required(method, "secret", self.secret)?);
            }
            AuthMethod::Token => {
                creds.username = Some(required(method, "username", self.username)?);
                creds.token = Some(required(method, "token", self.token)?);
            }
        }

        Ok(creds)
    }
}

fn required(method: AuthMethod, field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::InvalidCredentials(format!(
            "{} authentication requires a {field}",
            method.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("example.com", 9999)
    }

    #[test]
    fn url_uses_http_without_tls() {
        assert_eq!(
            endpoint().url("/example/test").unwrap().as_str(),
            "http://example.com:9999/example/test"
        );
    }

    #[test]
    fn url_uses_https_with_tls() {
        let ep = endpoint().with_tls(true);
        assert_eq!(
            ep.url("/organizations").unwrap().as_str(),
            "https://example.com:9999/organizations"
        );
    }

    #[test]
    fn url_inserts_missing_slash() {
        assert_eq!(
            endpoint().url("health/status").unwrap().as_str(),
            "http://example.com:9999/health/status"
        );
    }

    #[test]
    fn url_percent_encodes_path_and_keeps_query() {
        let url = endpoint().url("/organizations/a b?name=x y").unwrap();
        assert_eq!(url.path(), "/organizations/a%20b");
        assert_eq!(url.query(), Some("name=x%20y"));
    }

    #[test]
    fn url_rejects_bad_host_and_fragment() {
        let err = Endpoint::new("exa mple.com", 80).url("/").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
        let err = endpoint().url("/organizations#top").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn hmac_without_secret_fails() {
        let err = Credentials::builder(endpoint(), AuthMethod::Hmac)
            .username("admin")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials(ref m) if m.contains("secret")));
    }

    #[test]
    fn empty_field_counts_as_missing() {
        let err = Credentials::basic(endpoint(), "test", "").unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials(_)));
        let err = Credentials::token(endpoint(), "", "abc").unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials(ref m) if m.contains("username")));
    }

    #[test]
    fn unused_fields_are_dropped() {
        let creds = Credentials::builder(endpoint(), AuthMethod::Hmac)
            .username("admin")
            .secret("sekrit")
            .password("ignored")
            .token("ignored")
            .build()
            .unwrap();
        assert_eq!(creds.secret(), Some("sekrit"));
        assert!(creds.password().is_none());
        assert!(creds.api_token().is_none());

        let none = Credentials::builder(endpoint(), AuthMethod::None)
            .username("someone")
            .build()
            .unwrap();
        assert!(none.username().is_none());
    }

    #[test]
    fn token_credentials_expose_api_token() {
        let creds = Credentials::token(endpoint(), "leslie", "eyJ0.abc").unwrap();
        assert_eq!(creds.method(), AuthMethod::Token);
        assert_eq!(creds.username(), Some("leslie"));
        assert_eq!(creds.api_token(), Some("eyJ0.abc"));
        assert!(creds.secret().is_none());
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = Credentials::none(Endpoint::new("", 80)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::hmac(endpoint(), "admin", "sekrit").unwrap();
        let out = format!("{creds:?}");
        assert!(out.contains("admin"));
        assert!(!out.contains("sekrit"));
    }
}
