//! Client configuration

use crate::error::{OperationError, Result};

/// Default control plane endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.skylift.dev/v1";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "SKYLIFT_API_TOKEN";

/// Environment variable overriding the API endpoint.
pub const URL_ENV: &str = "SKYLIFT_API_URL";

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the control plane, without a trailing slash.
    pub base_url: String,

    /// Bearer token sent with every request.
    pub api_token: String,
}

impl ClientConfig {
    /// Create a configuration for the default endpoint.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
        }
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a configuration from `SKYLIFT_API_TOKEN` and `SKYLIFT_API_URL`.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var(TOKEN_ENV)
            .map_err(|_| OperationError::validation(format!("{} is not set", TOKEN_ENV)))?;

        let config = Self::new(api_token);
        match std::env::var(URL_ENV) {
            Ok(url) => Ok(config.with_base_url(url)),
            Err(_) => Ok(config),
        }
    }
}
