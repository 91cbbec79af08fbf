//! Blocking HTTP transport.
//!
//! # Design
//! `Transport` is the single seam between request data and the network.
//! `UreqTransport` performs exactly one round trip per call with ureq's
//! default timeouts. Non-2xx statuses come back as data so the response
//! parser owns status interpretation.

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::credentials::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse, SignedRequest};

/// Executes one authenticated request against `url`.
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, request: &SignedRequest) -> Result<HttpResponse, ApiError>;
}

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(endpoint: &Endpoint) -> Self {
        let mut config = Agent::config_builder().http_status_as_error(false);
        if endpoint.tls && endpoint.skip_tls_verify {
            config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
        }
        Self {
            agent: config.build().new_agent(),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, url: &str, request: &SignedRequest) -> Result<HttpResponse, ApiError> {
        let req = &request.request;
        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if req.method == HttpMethod::Post {
                    self.agent.post(url)
                } else {
                    self.agent.put(url)
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &req.body {
                    Some(body) => builder
                        .content_type(body.content_type.as_str())
                        .send(body.data.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            other => return Err(ApiError::UnsupportedMethod(other.as_str().to_string())),
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
