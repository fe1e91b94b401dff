//! Subgraph resource adapter
//!
//! `branch_id` and `name` are replace-only; the URL is the one field in the
//! system that updates in place. The update hook therefore calls the update
//! mutation and nothing else.

use super::{split_import_id, Diagnostic, ManagedResource, ReadOutcome};
use crate::api::client::ApiClient;
use crate::api::subgraph::{self, CreateSubgraphInput, Subgraph};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

const IMPORT_HINT: &str = "branch_id/subgraph_name";

/// Locally tracked record for a subgraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphState {
    #[serde(default)]
    pub id: Option<String>,
    pub branch_id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SubgraphState {
    pub fn new(
        branch_id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            branch_id: branch_id.into(),
            name: name.into(),
            url: url.into(),
            created_at: None,
        }
    }

    /// True when identity fields differ, which forces destroy-then-create.
    /// A URL-only change never does.
    pub fn replace_required(prior: &Self, desired: &Self) -> bool {
        prior.branch_id != desired.branch_id || prior.name != desired.name
    }

    fn apply(&mut self, subgraph: &Subgraph) {
        self.id = Some(subgraph.id.clone());
        self.url = subgraph.url.clone();
        self.created_at = Some(
            subgraph
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
}

/// Adapter managing subgraphs.
pub struct SubgraphResource {
    client: ApiClient,
}

impl SubgraphResource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManagedResource for SubgraphResource {
    type State = SubgraphState;

    const TYPE_NAME: &'static str = "subgraph";

    async fn create(&self, state: &mut SubgraphState) -> Result<(), Diagnostic> {
        let subgraph = subgraph::create_subgraph(
            &self.client,
            CreateSubgraphInput {
                branch_id: state.branch_id.clone(),
                subgraph_name: state.name.clone(),
                url: state.url.clone(),
            },
        )
        .await
        .map_err(|e| Diagnostic::client_error("create subgraph", &e))?;

        state.apply(&subgraph);
        Ok(())
    }

    async fn read(&self, state: &mut SubgraphState) -> Result<ReadOutcome, Diagnostic> {
        match subgraph::get_subgraph(&self.client, &state.branch_id, &state.name).await {
            Ok(subgraph) => {
                state.apply(&subgraph);
                Ok(ReadOutcome::Current)
            }
            Err(e) if e.is_not_found() => Ok(ReadOutcome::Gone),
            Err(e) => Err(Diagnostic::client_error("read subgraph", &e)),
        }
    }

    /// Update the URL in place. Requires the record to have been created or
    /// imported first, since the mutation is keyed by remote id.
    async fn update(&self, state: &mut SubgraphState) -> Result<(), Diagnostic> {
        let Some(id) = state.id.clone() else {
            return Err(Diagnostic::new(
                "Client Error",
                "Unable to update subgraph: record has no id",
            ));
        };

        let subgraph = subgraph::update_subgraph(&self.client, &id, &state.url)
            .await
            .map_err(|e| Diagnostic::client_error("update subgraph", &e))?;

        state.apply(&subgraph);
        Ok(())
    }

    async fn delete(&self, state: &SubgraphState) -> Result<(), Diagnostic> {
        let Some(id) = state.id.as_deref() else {
            return Err(Diagnostic::new(
                "Client Error",
                "Unable to delete subgraph: record has no id",
            ));
        };

        match subgraph::delete_subgraph(&self.client, id).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted.
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(Diagnostic::client_error("delete subgraph", &e)),
        }
    }

    async fn import(&self, id: &str) -> Result<SubgraphState, Diagnostic> {
        let parts = split_import_id(id, 2, IMPORT_HINT)?;
        let (branch_id, name) = (parts[0], parts[1]);

        let subgraph = subgraph::get_subgraph(&self.client, branch_id, name)
            .await
            .map_err(|e| {
                Diagnostic::new(
                    "Import Error",
                    format!("Unable to read subgraph during import: {e}"),
                )
            })?;

        let mut state = SubgraphState::new(branch_id, name, "");
        state.apply(&subgraph);
        Ok(state)
    }
}
