//! HTTP request and response types described as plain data.
//!
//! # Design
//! `HttpRequest` is the descriptor a caller asks for: verb, path and optional
//! body. Authentication never touches it; strategies wrap it in a
//! `SignedRequest` that carries the extra headers. The transport is the only
//! place that turns these values into network I/O.

use std::fmt;

use crate::error::ApiError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_YAML: &str = "application/x-yaml";

/// HTTP method for a request.
///
/// Only `Get`, `Post`, `Put` and `Delete` are supported by this layer. The
/// other verbs can be expressed so that they are rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Reject verbs outside GET/POST/PUT/DELETE.
    pub fn ensure_supported(&self) -> Result<(), ApiError> {
        match self {
            HttpMethod::Get | HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete => Ok(()),
            other => Err(ApiError::UnsupportedMethod(other.as_str().to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pre-serialized request body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub content_type: String,
    pub data: String,
}

/// An outbound request before authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path),
            body: None,
        }
    }

    pub fn with_body(mut self, content_type: &str, data: String) -> Self {
        self.body = Some(Body {
            content_type: content_type.to_string(),
            data,
        });
        self
    }
}

/// An `HttpRequest` decorated with the headers an auth strategy produced.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub request: HttpRequest,
    pub headers: Vec<(String, String)>,
}

impl SignedRequest {
    /// Wrap a request with no additional headers.
    pub fn unsigned(request: HttpRequest) -> Self {
        Self {
            request,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: String) -> Self {
        self.headers.push((name.to_string(), value));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw outcome of one round trip. Status and body are the whole contract
/// with the parser.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_gets_leading_slash() {
        assert_eq!(HttpRequest::new(HttpMethod::Get, "users").path, "/users");
        assert_eq!(HttpRequest::new(HttpMethod::Get, "/users").path, "/users");
    }

    #[test]
    fn patch_and_head_are_unsupported() {
        assert!(HttpMethod::Delete.ensure_supported().is_ok());
        let err = HttpMethod::Patch.ensure_supported().unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMethod(ref m) if m == "PATCH"));
        assert!(HttpMethod::Head.ensure_supported().is_err());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let signed = SignedRequest::unsigned(HttpRequest::new(HttpMethod::Get, "/"))
            .with_header("X-Hmac-Nonce", "abc".to_string());
        assert_eq!(signed.header("x-hmac-nonce"), Some("abc"));
        assert_eq!(signed.header("authorization"), None);
    }
}
