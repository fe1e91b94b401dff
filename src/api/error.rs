//! Error taxonomy for Graphplane API calls
//!
//! Every failure class gets its own variant so callers branch on structure,
//! never on message text. The `NotFound` sentinel in particular drives the
//! prune-on-read and idempotent-delete behavior in the resource adapters.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A single error entry from a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl std::fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors produced by the transport client and entity operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The HTTP call itself failed (connect, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A 200 response carrying a non-empty `errors` array. Partial data is
    /// kept for diagnosis but discarded by higher layers.
    #[error("GraphQL errors: {}", .errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "))]
    GraphQl {
        errors: Vec<GraphQlError>,
        data: Option<Value>,
    },

    /// The remote reported no entity of the given kind. Read and import use
    /// this to prune local records; delete treats it as already done.
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    /// A mutation came back as one of its named failure shapes.
    #[error("{operation} failed: {detail}")]
    Rejected {
        operation: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// True when the remote reported the entity as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Rejection for an unrecognized tagged-union payload. The raw payload
    /// goes into the detail so the unknown shape can be diagnosed.
    pub(crate) fn unexpected_payload(operation: &'static str, payload: &Value) -> Self {
        ApiError::Rejected {
            operation,
            detail: format!("unexpected response payload: {payload}"),
        }
    }
}
