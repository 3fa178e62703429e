//! Backend REST API client.
//!
//! Every backend response is wrapped in the same JSON envelope:
//!
//! ```json
//! { "status": "success", "data": { ... }, "message": "optional" }
//! { "status": "error", "message": "...", "code": 422, "errors": [{ "field": "name", "message": "required" }] }
//! ```
//!
//! # Architecture
//!
//! - [`ApiClient`] owns the HTTP connection pool and borrows the token from
//!   the shared [`SessionManager`](crate::session::SessionManager)
//! - Authorization failures trigger one coalesced token refresh
//!   ([`SingleFlight`]) and a single retry of the original call
//! - Errors keep everything the backend said: message, code and per-field
//!   validation messages

pub mod client;
pub mod single_flight;

pub use client::ApiClient;
pub use single_flight::SingleFlight;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    pub data: T,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Discard the envelope, keeping the payload.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Transform the payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: f(self.data),
            message: self.message,
        }
    }
}

/// A single field-level validation message reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field name → message, as rendered next to each form input.
pub type FieldErrors = BTreeMap<String, String>;

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, rename = "errors", skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ErrorEnvelope {
    /// Field errors keyed by field name. A later message for the same field
    /// wins, matching how the forms display them.
    #[must_use]
    pub fn field_error_map(&self) -> FieldErrors {
        self.field_errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with an error envelope.
    #[error("{}", .0.message)]
    Api(ErrorEnvelope),

    /// The backend rejected our credentials (HTTP 401), and refreshing the
    /// token did not help.
    #[error("Unauthorized: {}", .0.message)]
    Unauthorized(ErrorEnvelope),

    /// No response was received at all.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request path could not be turned into a URL.
    #[error("Invalid endpoint {path}: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

/// `code` reported for transport failures, distinct from any HTTP status.
pub const TRANSPORT_FAILURE_CODE: i64 = 0;

impl ApiError {
    /// The error envelope, when the backend produced one.
    #[must_use]
    pub const fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            Self::Api(envelope) | Self::Unauthorized(envelope) => Some(envelope),
            _ => None,
        }
    }

    /// Backend-supplied code (usually the HTTP status). Transport failures
    /// report [`TRANSPORT_FAILURE_CODE`].
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Transport(_) => Some(TRANSPORT_FAILURE_CODE),
            other => other.envelope().and_then(|e| e.code),
        }
    }

    /// Field-level validation messages, empty when there are none.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        self.envelope()
            .map(ErrorEnvelope::field_error_map)
            .unwrap_or_default()
    }

    /// `true` when no response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// `true` for authorization failures.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// A message fit for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(envelope) | Self::Unauthorized(envelope) => envelope.message.clone(),
            Self::Transport(_) => "Unable to reach the server".to_string(),
            Self::Decode(_) | Self::Endpoint { .. } => "Unexpected response from the server".to_string(),
        }
    }
}
