//! Branches
//!
//! A branch is an isolated variant of a graph's schema and configuration,
//! identified by name within its graph. The platform assigns the environment
//! kind (`PREVIEW` or `PRODUCTION`) and the operation-check flags; production
//! branches refuse deletion.
//!
//! Branches are keyed by the full `(account_slug, graph_slug, name)` triple
//! for lookup and deletion, matching the import key format.

use super::client::ApiClient;
use super::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Environment kind of a branch, assigned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchEnvironment {
    Preview,
    Production,
}

impl std::fmt::Display for BranchEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchEnvironment::Preview => f.write_str("PREVIEW"),
            BranchEnvironment::Production => f.write_str("PRODUCTION"),
        }
    }
}

/// The graph a branch belongs to, as returned nested in branch payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchGraph {
    pub id: String,
    pub slug: String,
}

/// A Graphplane branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub environment: BranchEnvironment,
    pub operation_checks_enabled: bool,
    pub operation_checks_ignore_usage_data: bool,
    pub created_at: DateTime<Utc>,
    pub graph: BranchGraph,
}

/// Input for creating a branch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchInput {
    pub account_slug: String,
    pub graph_slug: String,
    pub branch_name: String,
}

/// Input for deleting a branch.
#[derive(Debug, Clone)]
pub struct DeleteBranchInput {
    pub account_slug: String,
    pub graph_slug: String,
    pub branch_name: String,
}

const BRANCH_FIELDS: &str = r#"
    id
    name
    environment
    operationChecksEnabled
    operationChecksIgnoreUsageData
    createdAt
    graph {
        id
        slug
    }
"#;

/// Outcome of the `branchCreate` mutation.
#[derive(Debug)]
enum BranchCreateOutcome {
    /// The success shape is the platform's `Query` projection re-selecting
    /// the branch that was just created.
    Success(Branch),
    BranchAlreadyExists,
    GraphDoesNotExist,
    GraphNotSelfHosted,
    Other(Value),
}

impl BranchCreateOutcome {
    fn decode(payload: Value) -> Self {
        #[derive(Deserialize)]
        struct Success {
            branch: Branch,
        }

        if let Ok(success) = serde_json::from_value::<Success>(payload.clone()) {
            if !success.branch.id.is_empty() {
                return Self::Success(success.branch);
            }
        }

        match payload.get("__typename").and_then(Value::as_str) {
            Some("BranchAlreadyExistsError") => Self::BranchAlreadyExists,
            Some("GraphDoesNotExistError") => Self::GraphDoesNotExist,
            Some("GraphNotSelfHostedError") => Self::GraphNotSelfHosted,
            _ => Self::Other(payload),
        }
    }

    fn into_result(self) -> Result<Branch, ApiError> {
        const OP: &str = "branch create";
        match self {
            Self::Success(branch) => Ok(branch),
            Self::BranchAlreadyExists => Err(ApiError::Rejected {
                operation: OP,
                detail: "BranchAlreadyExistsError: branch already exists".into(),
            }),
            Self::GraphDoesNotExist => Err(ApiError::Rejected {
                operation: OP,
                detail: "GraphDoesNotExistError: graph does not exist".into(),
            }),
            Self::GraphNotSelfHosted => Err(ApiError::Rejected {
                operation: OP,
                detail: "GraphNotSelfHostedError: graph is not self-hosted".into(),
            }),
            Self::Other(payload) => Err(ApiError::unexpected_payload(OP, &payload)),
        }
    }
}

/// Create a branch on a graph.
pub async fn create_branch(client: &ApiClient, input: CreateBranchInput) -> Result<Branch, ApiError> {
    let query = format!(
        r#"
        mutation CreateBranch(
            $input: BranchCreateInput!,
            $accountSlug: String!,
            $graphSlug: String!,
            $branchName: String!
        ) {{
            branchCreate(input: $input) {{
                ... on Query {{
                    branch(accountSlug: $accountSlug, graphSlug: $graphSlug, branchName: $branchName) {{
                        {BRANCH_FIELDS}
                    }}
                }}
                ... on BranchAlreadyExistsError {{
                    __typename
                }}
                ... on GraphDoesNotExistError {{
                    __typename
                }}
                ... on GraphNotSelfHostedError {{
                    __typename
                }}
            }}
        }}
        "#
    );

    tracing::debug!(
        "creating branch {}/{}/{}",
        input.account_slug,
        input.graph_slug,
        input.branch_name
    );

    let variables = json!({
        "accountSlug": input.account_slug.clone(),
        "graphSlug": input.graph_slug.clone(),
        "branchName": input.branch_name.clone(),
        "input": input,
    });

    let data = client.execute(&query, variables).await?;
    let payload = data.get("branchCreate").cloned().unwrap_or(Value::Null);

    BranchCreateOutcome::decode(payload).into_result()
}

/// Look up a branch by account slug, graph slug, and branch name.
pub async fn get_branch(
    client: &ApiClient,
    account_slug: &str,
    graph_slug: &str,
    branch_name: &str,
) -> Result<Branch, ApiError> {
    let query = format!(
        r#"
        query GetBranch($accountSlug: String!, $graphSlug: String!, $branchName: String!) {{
            branch(accountSlug: $accountSlug, graphSlug: $graphSlug, branchName: $branchName) {{
                {BRANCH_FIELDS}
            }}
        }}
        "#
    );

    tracing::debug!("fetching branch {account_slug}/{graph_slug}/{branch_name}");

    let data = client
        .execute(
            &query,
            json!({
                "accountSlug": account_slug,
                "graphSlug": graph_slug,
                "branchName": branch_name,
            }),
        )
        .await?;

    let branch: Option<Branch> =
        serde_json::from_value(data.get("branch").cloned().unwrap_or_default())
            .map_err(ApiError::Decode)?;

    branch.ok_or(ApiError::NotFound { kind: "branch" })
}

const DELETE_BRANCH: &str = r#"
    mutation DeleteBranch($accountSlug: String!, $graphSlug: String!, $branchName: String!) {
        branchDelete(accountSlug: $accountSlug, graphSlug: $graphSlug, branchName: $branchName) {
            ... on Query {
                __typename
            }
            ... on BranchDoesNotExistError {
                __typename
            }
            ... on CannotDeleteProductionBranchError {
                __typename
            }
        }
    }
"#;

/// Delete a branch by its identifying triple. A does-not-exist result
/// decodes to `NotFound`; deleting a production branch is rejected by the
/// platform.
pub async fn delete_branch(client: &ApiClient, input: DeleteBranchInput) -> Result<(), ApiError> {
    tracing::debug!(
        "deleting branch {}/{}/{}",
        input.account_slug,
        input.graph_slug,
        input.branch_name
    );

    let data = client
        .execute(
            DELETE_BRANCH,
            json!({
                "accountSlug": input.account_slug,
                "graphSlug": input.graph_slug,
                "branchName": input.branch_name,
            }),
        )
        .await?;
    let payload = data.get("branchDelete").cloned().unwrap_or(Value::Null);

    match payload.get("__typename").and_then(Value::as_str) {
        Some("Query") => Ok(()),
        Some("BranchDoesNotExistError") => Err(ApiError::NotFound { kind: "branch" }),
        Some("CannotDeleteProductionBranchError") => Err(ApiError::Rejected {
            operation: "branch delete",
            detail: "CannotDeleteProductionBranchError: cannot delete a production branch".into(),
        }),
        _ => Err(ApiError::unexpected_payload("branch delete", &payload)),
    }
}
