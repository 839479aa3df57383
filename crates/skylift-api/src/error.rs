//! Skylift API error types

use serde::Deserialize;
use thiserror::Error;

/// Uniform error for every failure path in the client and the orchestrator.
///
/// Whatever went wrong, at least one of status, code or reason is populated,
/// so callers always have something to log or branch on.
#[derive(Error, Debug, Clone)]
pub enum OperationError {
    /// The control plane answered with a non-success status.
    #[error("{method} {url} returned {status}: {}", .reason.as_deref().unwrap_or("unknown error"))]
    Api {
        status: u16,
        code: Option<String>,
        reason: Option<String>,
        request_id: Option<String>,
        body: Option<String>,
        method: String,
        url: String,
    },

    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("{method} {url} failed: {reason}")]
    Transport {
        method: String,
        url: String,
        reason: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response from {method} {url}: {reason}")]
    Decode {
        method: String,
        url: String,
        reason: String,
    },

    /// Caller supplied missing or malformed input; nothing was sent.
    #[error("{reason}")]
    Validation { reason: String },

    /// A polling deadline elapsed before the watched condition held.
    #[error("{reason}")]
    Timeout { reason: String },

    /// A polling loop was cancelled through its cancellation token.
    #[error("{reason}")]
    Cancelled { reason: String },
}

impl OperationError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::Timeout {
            reason: reason.into(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(method: &str, url: &str, source: &reqwest::Error) -> Self {
        Self::Transport {
            method: method.to_string(),
            url: url.to_string(),
            reason: source.to_string(),
        }
    }

    pub(crate) fn decode(method: &str, url: &str, source: &reqwest::Error) -> Self {
        Self::Decode {
            method: method.to_string(),
            url: url.to_string(),
            reason: source.to_string(),
        }
    }

    /// Build an `Api` error from a non-success response.
    ///
    /// The body is expected to carry the control plane's error envelope
    /// (`{"error": {"code", "message", "request_id"}}`); anything else is
    /// kept verbatim as the reason. The raw body is preserved either way.
    pub fn from_response(
        status: u16,
        method: &str,
        url: &str,
        header_request_id: Option<String>,
        body: &str,
    ) -> Self {
        let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
        let detail = envelope.and_then(|e| e.error);

        let (code, reason, body_request_id) = match detail {
            Some(d) => (d.code, d.message, d.request_id),
            None => {
                let trimmed = body.trim();
                let reason = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                };
                (None, reason, None)
            }
        };

        Self::Api {
            status,
            code,
            reason,
            request_id: header_request_id.or(body_request_id),
            body: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
            method: method.to_string(),
            url: url.to_string(),
        }
    }

    /// HTTP status of the originating call, when the failure was remote.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code, when the control plane supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Human-readable reason.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Api { reason, .. } => reason.as_deref(),
            Self::Transport { reason, .. }
            | Self::Decode { reason, .. }
            | Self::Validation { reason }
            | Self::Timeout { reason }
            | Self::Cancelled { reason } => Some(reason),
        }
    }

    /// Correlation id of the originating request, when one was returned.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
    request_id: Option<String>,
}

pub type Result<T> = std::result::Result<T, OperationError>;
