//! Pluggable request authentication.
//!
//! # Design
//! Four schemes share one contract, `AuthStrategy::authenticate`. The client
//! picks a strategy once, from `Credentials::method`, and keeps it for its
//! lifetime. A strategy handed credentials for another scheme fails with
//! `InvalidCredentials` instead of passing the request through unsigned.

mod basic;
mod hmac_auth;
pub mod signer;
mod token;

pub use basic::BasicAuth;
pub use hmac_auth::{
    Clock, HmacAuth, NonceSource, OsNonce, SystemClock, HEADER_ALGORITHM, HEADER_DATE, HEADER_NONCE,
};
pub use token::TokenAuth;

use crate::credentials::{AuthMethod, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, SignedRequest};

pub const AUTHORIZATION: &str = "Authorization";

/// Decorates an outbound request with the headers one scheme requires.
pub trait AuthStrategy: Send + Sync {
    /// The scheme this strategy implements.
    fn method(&self) -> AuthMethod;

    fn authenticate(
        &self,
        request: HttpRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest, ApiError>;
}

/// Default strategy for `method`.
pub fn strategy_for(method: AuthMethod) -> Box<dyn AuthStrategy> {
    match method {
        AuthMethod::None => Box::new(NoAuth),
        AuthMethod::Basic => Box::new(BasicAuth),
        AuthMethod::Token => Box::new(TokenAuth),
        AuthMethod::Hmac => Box::new(HmacAuth::new()),
    }
}

/// Pass-through: adds no headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthStrategy for NoAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::None
    }

    fn authenticate(
        &self,
        request: HttpRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest, ApiError> {
        ensure_method(self.method(), credentials)?;
        Ok(SignedRequest::unsigned(request))
    }
}

fn ensure_method(expected: AuthMethod, credentials: &Credentials) -> Result<(), ApiError> {
    if credentials.method() == expected {
        return Ok(());
    }
    Err(ApiError::InvalidCredentials(format!(
        "{} strategy invoked with {} credentials",
        expected.as_str(),
        credentials.method().as_str()
    )))
}

/// Username of credentials already validated for `method`.
fn username(credentials: &Credentials) -> Result<&str, ApiError> {
    credentials
        .username()
        .ok_or_else(|| ApiError::InvalidCredentials("missing username".to_string()))
}
