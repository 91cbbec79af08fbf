//! Error types for the authenticated-request layer.
//!
//! # Design
//! Every failure a call can hit maps to exactly one variant, and each variant
//! carries a message that is fit for direct display. `Server` keeps the HTTP
//! status separate from the server-supplied description so callers can branch
//! on the code (e.g. 404) without parsing text.

use thiserror::Error;

/// Errors returned by `ApiClient`, the auth strategies and the response parser.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The fields required by the selected auth method are missing or empty.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The HTTP verb has no canonical representation in this layer.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The endpoint and path do not form a valid URI.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The network round trip failed (DNS, refused connection, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status other than 200.
    #[error("server returned HTTP {status}: {description}")]
    Server { status: u16, description: String },

    /// HTTP 200, but the body is not valid JSON.
    #[error("{0}")]
    MalformedBody(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// HTTP status carried by a `Server` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
