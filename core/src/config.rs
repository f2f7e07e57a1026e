//! Client configuration, injected into [`ApiClient`](crate::ApiClient).

use std::env;

use tracing::warn;

use crate::error::ConfigError;

pub const API_URL_VAR: &str = "API_URL";

/// Fixed settings shared by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_url: String,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read the base URL from `API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(API_URL_VAR) {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value.trim())),
            _ => {
                warn!("{API_URL_VAR} not set");
                Err(ConfigError::Missing(API_URL_VAR))
            }
        }
    }

    /// Base URL with no trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
