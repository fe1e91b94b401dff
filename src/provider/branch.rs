//! Branch resource adapter
//!
//! Branches are keyed by the `(account_slug, graph_slug, name)` triple for
//! every operation, including deletion and the 3-segment import key. All
//! three fields are replace-only; the environment kind, check-policy flags,
//! and timestamp are remote-assigned.

use super::{split_import_id, Diagnostic, ManagedResource, ReadOutcome};
use crate::api::branch::{self, Branch, CreateBranchInput, DeleteBranchInput};
use crate::api::client::ApiClient;
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

const IMPORT_HINT: &str = "account_slug/graph_slug/branch_name";

/// Locally tracked record for a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    #[serde(default)]
    pub id: Option<String>,
    pub account_slug: String,
    pub graph_slug: String,
    pub name: String,
    /// `PREVIEW` or `PRODUCTION`, remote-assigned.
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub operation_checks_enabled: Option<bool>,
    #[serde(default)]
    pub operation_checks_ignore_usage_data: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl BranchState {
    pub fn new(
        account_slug: impl Into<String>,
        graph_slug: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            account_slug: account_slug.into(),
            graph_slug: graph_slug.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when identity fields differ, which forces destroy-then-create.
    pub fn replace_required(prior: &Self, desired: &Self) -> bool {
        prior.account_slug != desired.account_slug
            || prior.graph_slug != desired.graph_slug
            || prior.name != desired.name
    }

    fn apply(&mut self, branch: &Branch) {
        self.id = Some(branch.id.clone());
        self.environment = Some(branch.environment.to_string());
        self.operation_checks_enabled = Some(branch.operation_checks_enabled);
        self.operation_checks_ignore_usage_data =
            Some(branch.operation_checks_ignore_usage_data);
        self.created_at = Some(branch.created_at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    fn delete_input(&self) -> DeleteBranchInput {
        DeleteBranchInput {
            account_slug: self.account_slug.clone(),
            graph_slug: self.graph_slug.clone(),
            branch_name: self.name.clone(),
        }
    }
}

/// Adapter managing branches.
pub struct BranchResource {
    client: ApiClient,
}

impl BranchResource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManagedResource for BranchResource {
    type State = BranchState;

    const TYPE_NAME: &'static str = "branch";

    async fn create(&self, state: &mut BranchState) -> Result<(), Diagnostic> {
        let branch = branch::create_branch(
            &self.client,
            CreateBranchInput {
                account_slug: state.account_slug.clone(),
                graph_slug: state.graph_slug.clone(),
                branch_name: state.name.clone(),
            },
        )
        .await
        .map_err(|e| Diagnostic::client_error("create branch", &e))?;

        state.apply(&branch);
        Ok(())
    }

    async fn read(&self, state: &mut BranchState) -> Result<ReadOutcome, Diagnostic> {
        match branch::get_branch(
            &self.client,
            &state.account_slug,
            &state.graph_slug,
            &state.name,
        )
        .await
        {
            Ok(branch) => {
                state.apply(&branch);
                Ok(ReadOutcome::Current)
            }
            Err(e) if e.is_not_found() => Ok(ReadOutcome::Gone),
            Err(e) => Err(Diagnostic::client_error("read branch", &e)),
        }
    }

    async fn update(&self, _state: &mut BranchState) -> Result<(), Diagnostic> {
        Err(Diagnostic::new(
            "Update Not Supported",
            "Branch updates are not supported. Changes to account_slug, \
             graph_slug, or name require resource replacement.",
        ))
    }

    async fn delete(&self, state: &BranchState) -> Result<(), Diagnostic> {
        match branch::delete_branch(&self.client, state.delete_input()).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted. Production protection is not
            // swallowed: it surfaces as a diagnostic.
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(Diagnostic::client_error("delete branch", &e)),
        }
    }

    async fn import(&self, id: &str) -> Result<BranchState, Diagnostic> {
        let parts = split_import_id(id, 3, IMPORT_HINT)?;
        let (account_slug, graph_slug, name) = (parts[0], parts[1], parts[2]);

        let branch = branch::get_branch(&self.client, account_slug, graph_slug, name)
            .await
            .map_err(|e| {
                Diagnostic::new(
                    "Import Error",
                    format!("Unable to read branch during import: {e}"),
                )
            })?;

        let mut state = BranchState::new(account_slug, graph_slug, name);
        state.apply(&branch);
        Ok(state)
    }
}
