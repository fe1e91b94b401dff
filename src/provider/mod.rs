//! Resource adapters
//!
//! Binds the entity operations in [`crate::api`] to a declarative
//! create/read/update/delete/import lifecycle. Each adapter works on a local
//! state record: a hook either fully succeeds, mutating the record, or fails
//! with a [`Diagnostic`] leaving it untouched. The only states a record can
//! be in are absent and present; there is nothing pending in between.
//!
//! - [`graph`] - top-level container, replace-only
//! - [`branch`] - isolated schema variant of a graph, replace-only
//! - [`subgraph`] - service endpoint on a branch; its URL updates in place

pub mod branch;
pub mod graph;
pub mod subgraph;

use crate::api::client::{ApiClient, DEFAULT_API_URL};
use crate::api::error::ApiError;
use crate::config::Config;
use async_trait::async_trait;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "GRAPHPLANE_API_KEY";

/// A host-facing failure record: a short summary plus the underlying detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Wrap an API failure with a description of what was being attempted.
    pub fn client_error(action: &str, err: &ApiError) -> Self {
        Self::new("Client Error", format!("Unable to {action}: {err}"))
    }

    /// Format violation in a composite import key. Never touches the network.
    pub fn import_format(expected: &str, got: &str) -> Self {
        Self::new(
            "Import Error",
            format!("Invalid import ID format. Expected '{expected}', got: {got}"),
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

impl std::error::Error for Diagnostic {}

/// What a refresh found out about a tracked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The remote entity is live; computed fields have been refreshed.
    Current,
    /// The remote reports the entity gone. The host must drop the local
    /// record; this is not an error.
    Gone,
}

/// The declarative lifecycle every resource adapter implements.
///
/// Hooks are synchronous from the host's point of view: each call is one
/// remote round trip that either commits fully or reports a diagnostic.
#[async_trait]
pub trait ManagedResource {
    type State;

    /// Resource type name used in diagnostics and CLI output.
    const TYPE_NAME: &'static str;

    /// absent -> present. Populates every computed field from the remote
    /// response on success.
    async fn create(&self, state: &mut Self::State) -> Result<(), Diagnostic>;

    /// Refresh computed fields by parent reference + identifying name.
    async fn read(&self, state: &mut Self::State) -> Result<ReadOutcome, Diagnostic>;

    /// In-place update. Only the subgraph URL supports it; all other
    /// adapters report an explicit "update not supported" diagnostic since
    /// their fields are replace-only and the host should never route an
    /// update here.
    async fn update(&self, state: &mut Self::State) -> Result<(), Diagnostic>;

    /// present -> absent. An already-deleted entity is success.
    async fn delete(&self, state: &Self::State) -> Result<(), Diagnostic>;

    /// Adopt a pre-existing remote entity from a composite import key.
    async fn import(&self, id: &str) -> Result<Self::State, Diagnostic>;
}

/// Split a composite import key into exactly `expected` non-empty segments.
///
/// Any other segment count, or any empty segment, is a format error;
/// `hint` names the expected shape in the diagnostic.
pub fn split_import_id<'a>(
    id: &'a str,
    expected: usize,
    hint: &str,
) -> Result<Vec<&'a str>, Diagnostic> {
    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return Err(Diagnostic::import_format(hint, id));
    }
    Ok(parts)
}

/// Shared handle over the configured API client, handing out one adapter per
/// resource kind. Threaded explicitly into each adapter; there is no global
/// client state.
#[derive(Clone, Debug)]
pub struct Provider {
    client: ApiClient,
}

impl Provider {
    /// Build a provider from configuration. The API key comes from the
    /// config value or the `GRAPHPLANE_API_KEY` environment variable;
    /// missing both is a hard configuration error before any resource
    /// operation runs.
    pub fn new(config: &Config) -> Result<Self, Diagnostic> {
        let api_key = config.effective_api_key().ok_or_else(|| {
            Diagnostic::new(
                "Unable to find API key",
                format!(
                    "API key cannot be empty. Set the api_key configuration value \
                     or the {API_KEY_ENV} environment variable."
                ),
            )
        })?;

        let api_url = config
            .effective_api_url()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let client = ApiClient::with_url(api_key, api_url)
            .map_err(|e| Diagnostic::new("Client Error", format!("Unable to build API client: {e}")))?;

        Ok(Self { client })
    }

    /// Build a provider around an existing client (tests, embedding hosts).
    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn graphs(&self) -> graph::GraphResource {
        graph::GraphResource::new(self.client.clone())
    }

    pub fn branches(&self) -> branch::BranchResource {
        branch::BranchResource::new(self.client.clone())
    }

    pub fn subgraphs(&self) -> subgraph::SubgraphResource {
        subgraph::SubgraphResource::new(self.client.clone())
    }
}
