//! Authenticated-request layer for a remote API.
//!
//! # Overview
//! Given a logical API call (path, verb, optional body), `ApiClient` attaches
//! the credentials of one of four schemes (none, HTTP Basic, token, HMAC
//! signature), performs a single blocking HTTP round trip, and turns the
//! response into decoded JSON or a classified `ApiError`.
//!
//! # Design
//! - `Credentials` are validated once and never change afterwards.
//! - `AuthStrategy` is an explicit trait with one implementation per scheme,
//!   chosen at construction from `Credentials::method`.
//! - Requests and responses are plain data (`HttpRequest`, `SignedRequest`,
//!   `HttpResponse`); only the `Transport` touches the network.
//! - `response::parse` is the single place that classifies outcomes.
//! - The crate reads no files and no environment variables. Configuration
//!   text is supplied by the caller through `ClientConfig::from_yaml_str`.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use auth::{AuthStrategy, BasicAuth, HmacAuth, NoAuth, TokenAuth};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use credentials::{AuthMethod, Credentials, Endpoint};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, SignedRequest};
pub use response::ParsedResponse;
pub use transport::{Transport, UreqTransport};
