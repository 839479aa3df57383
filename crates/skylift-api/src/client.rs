//! HTTP client for the Skylift control plane
//!
//! All resource modules go through the shared dispatch path here, which
//! injects bearer auth, logs the request, and converts non-success
//! responses into [`OperationError`].

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{OperationError, Result};

/// Response header carrying the control plane's correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Default per-request timeout. Long-running endpoints (the machine wait
/// call) override this per request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Skylift control plane API client.
///
/// Cheap to clone; safe for concurrent use from multiple tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ApiClient {
    /// Create a client from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                OperationError::validation(format!("failed to construct HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    /// Create a client from `SKYLIFT_API_TOKEN` / `SKYLIFT_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(&self.api_token)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&self.api_token)
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(&self.api_token)
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http
            .delete(self.url(path))
            .bearer_auth(&self.api_token)
    }

    /// Send a request and decode a successful JSON response.
    pub(crate) async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let (response, method, url) = self.dispatch(builder).await?;
        response
            .json()
            .await
            .map_err(|e| OperationError::decode(&method, &url, &e))
    }

    /// Send a request, discarding the body of a successful response.
    pub(crate) async fn execute_unit(&self, builder: RequestBuilder) -> Result<()> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<(Response, String, String)> {
        let request = builder
            .build()
            .map_err(|e| OperationError::validation(format!("failed to build request: {e}")))?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        tracing::debug!("{} {}", method, url);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| OperationError::transport(&method, &url, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok((response, method, url));
        }

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.unwrap_or_default();

        Err(OperationError::from_response(
            status.as_u16(),
            &method,
            &url,
            request_id,
            &body,
        ))
    }

    /// Reject empty required path components before any request is built.
    pub(crate) fn require(value: &str, what: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(OperationError::validation(format!(
                "{} must not be empty",
                what
            )));
        }
        Ok(())
    }
}
