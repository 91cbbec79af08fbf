use super::{ensure_method, username, AuthStrategy, AUTHORIZATION};
use crate::credentials::{AuthMethod, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, SignedRequest};

/// Bearer-style token: `Authorization: Token username:token`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuth;

impl AuthStrategy for TokenAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Token
    }

    fn authenticate(
        &self,
        request: HttpRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest, ApiError> {
        ensure_method(self.method(), credentials)?;
        let user = username(credentials)?;
        let token = credentials
            .api_token()
            .ok_or_else(|| ApiError::InvalidCredentials("missing token".to_string()))?;

        Ok(SignedRequest::unsigned(request).with_header(AUTHORIZATION, format!("Token {user}:{token}")))
    }
}
