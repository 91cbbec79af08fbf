use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use super::signer::{self, ALGORITHM};
use super::{ensure_method, username, AuthStrategy, AUTHORIZATION};
use crate::credentials::{AuthMethod, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, SignedRequest};

pub const HEADER_NONCE: &str = "X-Hmac-Nonce";
pub const HEADER_ALGORITHM: &str = "X-Hmac-Algorithm";
pub const HEADER_DATE: &str = "Date";

/// Source of the signing timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of single-use nonces. Every call must return a fresh value.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> String;
}

/// 128 bits from the operating system CSPRNG, lower-case hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonce;

impl NonceSource for OsNonce {
    fn next_nonce(&self) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Signs each request with HMAC-SHA256 over method, path, date and nonce.
///
/// The body is not part of the signature, so signing never needs to read or
/// rewrite it.
#[derive(Clone)]
pub struct HmacAuth {
    clock: Arc<dyn Clock>,
    nonces: Arc<dyn NonceSource>,
}

impl HmacAuth {
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(OsNonce))
    }

    /// Use a custom clock and nonce source, e.g. fixed values in tests.
    pub fn with_sources(clock: Arc<dyn Clock>, nonces: Arc<dyn NonceSource>) -> Self {
        Self { clock, nonces }
    }
}

impl Default for HmacAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStrategy for HmacAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Hmac
    }

    fn authenticate(
        &self,
        request: HttpRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest, ApiError> {
        request.method.ensure_supported()?;
        ensure_method(self.method(), credentials)?;
        let user = username(credentials)?;
        let secret = credentials
            .secret()
            .ok_or_else(|| ApiError::InvalidCredentials("missing secret".to_string()))?;

        let nonce = self.nonces.next_nonce();
        let date = signer::http_date(self.clock.now());
        let canonical = signer::canonical_string(request.method, &request.path, &date, &nonce);
        let signature = signer::sign(secret.as_bytes(), &canonical)?;
        debug!(method = %request.method, path = %request.path, %nonce, "signed request");

        Ok(SignedRequest::unsigned(request)
            .with_header(AUTHORIZATION, format!("HMAC {user}:{signature}"))
            .with_header(HEADER_NONCE, nonce)
            .with_header(HEADER_ALGORITHM, ALGORITHM.to_string())
            .with_header(HEADER_DATE, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Endpoint;
    use crate::http::HttpMethod;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct FixedNonce(&'static str);

    impl NonceSource for FixedNonce {
        fn next_nonce(&self) -> String {
            self.0.to_string()
        }
    }

    fn creds() -> Credentials {
        Credentials::hmac(Endpoint::new("example.com", 9999), "test", "sekrit").unwrap()
    }

    #[test]
    fn signs_all_supported_verbs() {
        let auth = HmacAuth::new();
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            let signed = auth
                .authenticate(HttpRequest::new(method, "/example/test"), &creds())
                .unwrap();
            assert!(signed.header("x-hmac-nonce").is_some());
            assert_eq!(signed.header("x-hmac-algorithm"), Some("sha256"));
            assert!(signed.header("date").is_some());
            assert!(signed.header("authorization").unwrap().starts_with("HMAC test:"));
        }
    }

    #[test]
    fn rejects_patch_before_signing() {
        let err = HmacAuth::new()
            .authenticate(HttpRequest::new(HttpMethod::Patch, "/example/test"), &creds())
            .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMethod(_)));
    }

    #[test]
    fn nonce_is_128_bit_hex() {
        let nonce = OsNonce.next_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn same_instant_yields_distinct_signatures() {
        let when = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let auth = HmacAuth::with_sources(Arc::new(FixedClock(when)), Arc::new(OsNonce));
        let request = HttpRequest::new(HttpMethod::Get, "/organizations");

        let a = auth.authenticate(request.clone(), &creds()).unwrap();
        let b = auth.authenticate(request, &creds()).unwrap();
        assert_eq!(a.header("date"), b.header("date"));
        assert_ne!(a.header("x-hmac-nonce"), b.header("x-hmac-nonce"));
        assert_ne!(a.header("authorization"), b.header("authorization"));
    }

    #[test]
    fn fixed_inputs_are_deterministic() {
        let when = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        let auth = HmacAuth::with_sources(
            Arc::new(FixedClock(when)),
            Arc::new(FixedNonce("0123456789abcdef0123456789abcdef")),
        );
        let signed = auth
            .authenticate(HttpRequest::new(HttpMethod::Get, "/organizations"), &creds())
            .unwrap();
        assert_eq!(signed.header("date"), Some("Sun, 06 Nov 1994 08:49:37 GMT"));
        assert_eq!(
            signed.header("authorization"),
            Some("HMAC test:tGfTFbnxYvnCwE113YecT7UI1hFB5bx3YC6bA0MunBA=")
        );
    }

    #[test]
    fn query_string_does_not_change_signature() {
        let when = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        let auth = HmacAuth::with_sources(
            Arc::new(FixedClock(when)),
            Arc::new(FixedNonce("0123456789abcdef0123456789abcdef")),
        );
        let signed = auth
            .authenticate(HttpRequest::new(HttpMethod::Get, "/organizations?limit=1"), &creds())
            .unwrap();
        assert_eq!(signed.request.path, "/organizations?limit=1");
        assert_eq!(
            signed.header("authorization"),
            Some("HMAC test:tGfTFbnxYvnCwE113YecT7UI1hFB5bx3YC6bA0MunBA=")
        );
    }

    #[test]
    fn body_is_left_untouched() {
        let request = HttpRequest::new(HttpMethod::Post, "/organizations")
            .with_body("application/json", r#"{"name":"x"}"#.to_string());
        let signed = HmacAuth::new().authenticate(request.clone(), &creds()).unwrap();
        assert_eq!(signed.request, request);
    }
}
