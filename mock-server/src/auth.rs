//! Server-side checks for the Basic, Token and HMAC schemes.
//!
//! Written against the wire format only, without the client crate, so the
//! integration tests catch any drift in the canonical string.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::{ApiFailure, SharedState, User};

/// Largest accepted distance between the `Date` header and server time.
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Middleware guarding every route except the health check.
pub async fn require_auth(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();
    let username = authenticate(&state, &method, &path, request.headers())?;
    debug!(%username, %method, %path, "authenticated");
    Ok(next.run(request).await)
}

fn authenticate(
    state: &SharedState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
) -> Result<String, ApiFailure> {
    let authorization = header(headers, "authorization")
        .ok_or_else(|| unauthorized("authentication required"))?;
    let (scheme, credentials) = authorization
        .split_once(' ')
        .ok_or_else(|| unauthorized("malformed authorization header"))?;

    match scheme {
        "Basic" => check_basic(state, credentials),
        "Token" => check_token(state, credentials),
        "HMAC" => check_hmac(state, method, path, headers, credentials),
        other => {
            warn!(scheme = other, "unknown authorization scheme");
            Err(unauthorized("unsupported authorization scheme"))
        }
    }
}

fn check_basic(state: &SharedState, encoded: &str) -> Result<String, ApiFailure> {
    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| unauthorized("malformed basic credentials"))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| unauthorized("malformed basic credentials"))?;
    let user = lookup(state, username)?;
    if user.password != password {
        return Err(unauthorized("invalid username or password"));
    }
    Ok(user.username.clone())
}

fn check_token(state: &SharedState, credentials: &str) -> Result<String, ApiFailure> {
    let (username, token) = credentials
        .split_once(':')
        .ok_or_else(|| unauthorized("malformed token credentials"))?;
    let user = lookup(state, username)?;
    if user.token != token {
        return Err(unauthorized("invalid token"));
    }
    Ok(user.username.clone())
}

fn check_hmac(
    state: &SharedState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    credentials: &str,
) -> Result<String, ApiFailure> {
    let (username, signature) = credentials
        .split_once(':')
        .ok_or_else(|| unauthorized("malformed HMAC credentials"))?;

    if header(headers, "x-hmac-algorithm") != Some("sha256") {
        return Err(unauthorized("unsupported HMAC algorithm"));
    }
    let nonce = header(headers, "x-hmac-nonce").ok_or_else(|| unauthorized("missing nonce"))?;
    let date = header(headers, "date").ok_or_else(|| unauthorized("missing date"))?;

    let sent = DateTime::parse_from_rfc2822(date)
        .map_err(|_| unauthorized("malformed date"))?
        .with_timezone(&Utc);
    if (Utc::now() - sent).num_seconds().abs() > MAX_CLOCK_SKEW_SECS {
        return Err(unauthorized("request date outside the accepted window"));
    }

    let user = lookup(state, username)?;
    let canonical = format!("{method}\n{path}\n{date}\n{nonce}");
    let expected = STANDARD
        .decode(signature)
        .map_err(|_| unauthorized("malformed signature"))?;
    let mut mac = HmacSha256::new_from_slice(user.secret.as_bytes())
        .map_err(|_| unauthorized("unusable secret"))?;
    mac.update(canonical.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| unauthorized("invalid signature"))?;

    let mut nonces = state
        .nonces
        .lock()
        .map_err(|_| ApiFailure::new(StatusCode::INTERNAL_SERVER_ERROR, "nonce store poisoned"))?;
    if !remember_nonce(&mut nonces, nonce, sent, Utc::now()) {
        return Err(unauthorized("nonce already used"));
    }
    Ok(user.username.clone())
}

/// Record `nonce`, returning `false` if it was already seen.
///
/// Entries whose `Date` has left the skew window are dropped first; a request
/// carrying one of them fails the date check before reaching the store.
pub fn remember_nonce(
    seen: &mut HashMap<String, DateTime<Utc>>,
    nonce: &str,
    sent: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    seen.retain(|_, at| (now - *at).num_seconds() <= MAX_CLOCK_SKEW_SECS);
    if seen.contains_key(nonce) {
        return false;
    }
    seen.insert(nonce.to_string(), sent);
    true
}

fn lookup<'a>(state: &'a SharedState, username: &str) -> Result<&'a User, ApiFailure> {
    state
        .users
        .get(username)
        .ok_or_else(|| unauthorized("unknown user"))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn unauthorized(description: &str) -> ApiFailure {
    ApiFailure::new(StatusCode::UNAUTHORIZED, description)
}
