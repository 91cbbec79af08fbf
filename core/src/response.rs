//! Turns a raw status + body into decoded data or a classified error.
//!
//! Only HTTP 200 counts as success. For any other status the server's
//! `description` field is surfaced when the body carries one; an unreadable
//! error body never hides the real status behind a decode error.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::http::HttpResponse;

pub const MALFORMED_BODY: &str = "failed to decode server response body";
pub const NO_DESCRIPTION: &str = "<no description available>";

/// Outcome of one round trip.
pub type ParsedResponse = Result<Value, ApiError>;

pub fn parse(status: u16, body: &[u8]) -> ParsedResponse {
    if status == 200 {
        return serde_json::from_slice(body).map_err(|e| {
            debug!(error = %e, body = %String::from_utf8_lossy(body), "undecodable response body");
            ApiError::MalformedBody(MALFORMED_BODY.to_string())
        });
    }

    let description = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("description").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    info!(status, %description, "server request failed");
    Err(ApiError::Server {
        status,
        description,
    })
}

pub fn parse_response(response: &HttpResponse) -> ParsedResponse {
    parse(response.status, &response.body)
}
