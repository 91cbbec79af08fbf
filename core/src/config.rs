//! Client configuration document.
//!
//! `ClientConfig` mirrors the YAML document the command-line layer keeps per
//! organization. This module only parses text handed to it; locating and
//! reading the file is the caller's job.

use serde::{Deserialize, Serialize};

use crate::credentials::{AuthMethod, Credentials, Endpoint};
use crate::error::ApiError;

pub const DEFAULT_PORT: u16 = 8361;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub ssl_verify_none: bool,
    #[serde(default = "default_auth")]
    pub auth: AuthMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_auth() -> AuthMethod {
    AuthMethod::Hmac
}

impl ClientConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ApiError> {
        serde_yaml::from_str(text).map_err(|e| ApiError::InvalidConfig(e.to_string()))
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.server, self.port)
            .with_tls(self.tls)
            .with_skip_tls_verify(self.ssl_verify_none)
    }
}

impl TryFrom<ClientConfig> for Credentials {
    type Error = ApiError;

    fn try_from(config: ClientConfig) -> Result<Self, Self::Error> {
        let mut builder = Credentials::builder(config.endpoint(), config.auth);
        if let Some(username) = &config.username {
            builder = builder.username(username);
        }
        if let Some(secret) = &config.secret {
            builder = builder.secret(secret);
        }
        if let Some(password) = &config.password {
            builder = builder.password(password);
        }
        if let Some(token) = &config.token {
            builder = builder.token(token);
        }
        builder.build()
    }
}
