//! HMAC-SHA256 request signing primitives.
//!
//! The canonical string is the upper-case verb, the request path, the `Date`
//! header value and the nonce, joined by `\n` with no trailing newline. Only
//! the path is signed; any `?query` suffix is left out. The
//! signature is the standard base64 encoding of HMAC-SHA256 keyed with the
//! shared secret. `verify` is the server-side mirror of `sign`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;
use crate::http::HttpMethod;

type HmacSha256 = Hmac<Sha256>;

/// Value of the `X-Hmac-Algorithm` header.
pub const ALGORITHM: &str = "sha256";

/// Build the canonical signing string. A query string on `path` is dropped.
pub fn canonical_string(method: HttpMethod, path: &str, date: &str, nonce: &str) -> String {
    let path = path.split_once('?').map_or(path, |(bare, _)| bare);
    [method.as_str(), path, date, nonce].join("\n")
}

/// `base64(HMAC-SHA256(secret, message))`.
pub fn sign(secret: &[u8], message: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| ApiError::InvalidCredentials(format!("unusable HMAC secret: {e}")))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a base64 signature against `message`.
pub fn verify(secret: &[u8], message: &str, signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Render a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
