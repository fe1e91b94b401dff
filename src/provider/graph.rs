//! Graph resource adapter
//!
//! `account_slug` and `slug` identify the graph and are replace-only: a host
//! that sees either change must destroy and recreate, never update. The id
//! and creation timestamp are populated from the remote.

use super::{split_import_id, Diagnostic, ManagedResource, ReadOutcome};
use crate::api::account;
use crate::api::client::ApiClient;
use crate::api::graph::{self, CreateGraphInput, Graph};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

const IMPORT_HINT: &str = "account_slug/graph_slug";

/// Locally tracked record for a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphState {
    /// Remote identifier, assigned on create.
    #[serde(default)]
    pub id: Option<String>,
    pub account_slug: String,
    pub slug: String,
    /// RFC 3339 creation timestamp, remote-assigned.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl GraphState {
    pub fn new(account_slug: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: None,
            account_slug: account_slug.into(),
            slug: slug.into(),
            created_at: None,
        }
    }

    /// True when identity fields differ, which forces destroy-then-create.
    pub fn replace_required(prior: &Self, desired: &Self) -> bool {
        prior.account_slug != desired.account_slug || prior.slug != desired.slug
    }

    fn apply(&mut self, graph: &Graph) {
        self.id = Some(graph.id.clone());
        self.created_at = Some(graph.created_at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
}

/// Adapter managing graphs.
pub struct GraphResource {
    client: ApiClient,
}

impl GraphResource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManagedResource for GraphResource {
    type State = GraphState;

    const TYPE_NAME: &'static str = "graph";

    async fn create(&self, state: &mut GraphState) -> Result<(), Diagnostic> {
        // The create mutation wants the account id, not its slug.
        let account = account::account_by_slug(&self.client, &state.account_slug)
            .await
            .map_err(|e| Diagnostic::client_error("get account", &e))?;

        let graph = graph::create_graph(
            &self.client,
            CreateGraphInput {
                account_id: account.id,
                graph_slug: state.slug.clone(),
            },
        )
        .await
        .map_err(|e| Diagnostic::client_error("create graph", &e))?;

        state.apply(&graph);
        Ok(())
    }

    async fn read(&self, state: &mut GraphState) -> Result<ReadOutcome, Diagnostic> {
        match graph::get_graph(&self.client, &state.account_slug, &state.slug).await {
            Ok(graph) => {
                state.apply(&graph);
                Ok(ReadOutcome::Current)
            }
            Err(e) if e.is_not_found() => Ok(ReadOutcome::Gone),
            Err(e) => Err(Diagnostic::client_error("read graph", &e)),
        }
    }

    async fn update(&self, _state: &mut GraphState) -> Result<(), Diagnostic> {
        // account_slug and slug are replace-only; reaching this hook means
        // the host routed a change here that can only be a replacement.
        Err(Diagnostic::new(
            "Update Not Supported",
            "Graph updates are not supported. Changes to account_slug or slug \
             require resource replacement.",
        ))
    }

    async fn delete(&self, state: &GraphState) -> Result<(), Diagnostic> {
        let Some(id) = state.id.as_deref() else {
            return Err(Diagnostic::new(
                "Client Error",
                "Unable to delete graph: record has no id",
            ));
        };

        match graph::delete_graph(&self.client, id).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted.
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(Diagnostic::client_error("delete graph", &e)),
        }
    }

    async fn import(&self, id: &str) -> Result<GraphState, Diagnostic> {
        let parts = split_import_id(id, 2, IMPORT_HINT)?;
        let (account_slug, graph_slug) = (parts[0], parts[1]);

        let graph = graph::get_graph(&self.client, account_slug, graph_slug)
            .await
            .map_err(|e| {
                Diagnostic::new(
                    "Import Error",
                    format!("Unable to read graph during import: {e}"),
                )
            })?;

        let mut state = GraphState::new(account_slug, graph_slug);
        state.apply(&graph);
        Ok(state)
    }
}

impl GraphResource {
    /// Lookup by raw remote id, for hosts that track graphs by identifier.
    pub async fn read_by_id(&self, id: &str) -> Result<GraphState, Diagnostic> {
        let graph = graph::get_graph_by_id(&self.client, id)
            .await
            .map_err(|e| Diagnostic::client_error("read graph", &e))?;

        let mut state = GraphState::new(graph.account.slug.clone(), graph.slug.clone());
        state.apply(&graph);
        Ok(state)
    }
}
