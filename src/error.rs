// ============================================================================
// File: src/error.rs
// Client error taxonomy
// ============================================================================

use std::time::Duration;
use thiserror::Error;

/// Every way an analysis, health check or type detection can fail
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Input rejected locally, before any network call
    #[error("{0}")]
    Validation(String),

    /// Network unreachable, DNS failure, connection reset
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// A success response whose body could not be understood
    #[error("Unexpected response from service: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("An analysis is already in progress")]
    Busy,
}

impl ClientError {
    /// Build a service error from a raw body, preferring the payload's `error` field
    pub fn from_service_body(status: u16, body: &str) -> Self {
        let payload = serde_json::from_str::<crate::models::ErrorPayload>(body).ok();
        if let Some(code) = payload.as_ref().and_then(|p| p.error_code.as_deref()) {
            tracing::debug!(status, error_code = code, "Service reported an error code");
        }

        let message = payload
            .map(|payload| payload.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        ClientError::Service { status, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}
