use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{ensure_method, username, AuthStrategy, AUTHORIZATION};
use crate::credentials::{AuthMethod, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, SignedRequest};

/// HTTP Basic: `Authorization: Basic base64(username:password)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuth;

impl AuthStrategy for BasicAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Basic
    }

    fn authenticate(
        &self,
        request: HttpRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest, ApiError> {
        ensure_method(self.method(), credentials)?;
        let user = username(credentials)?;
        let password = credentials
            .password()
            .ok_or_else(|| ApiError::InvalidCredentials("missing password".to_string()))?;

        let encoded = STANDARD.encode(format!("{user}:{password}"));
        Ok(SignedRequest::unsigned(request).with_header(AUTHORIZATION, format!("Basic {encoded}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Endpoint;
    use crate::http::HttpMethod;

    #[test]
    fn encodes_username_and_password() {
        let creds = Credentials::basic(Endpoint::new("example.com", 9999), "test", "sekrit").unwrap();
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            let signed = BasicAuth
                .authenticate(HttpRequest::new(method, "/example/test"), &creds)
                .unwrap();
            assert_eq!(signed.header("authorization"), Some("Basic dGVzdDpzZWtyaXQ="));
            assert_eq!(signed.headers.len(), 1);
        }
    }
}
