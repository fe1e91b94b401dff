//! Subgraphs
//!
//! A subgraph registers one composable service URL on a branch. The URL is
//! the single field in the whole system that supports a true in-place
//! update; everything else identifying a subgraph forces replacement.

use super::client::ApiClient;
use super::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A Graphplane subgraph.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subgraph {
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a subgraph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubgraphInput {
    pub branch_id: String,
    pub subgraph_name: String,
    pub url: String,
}

const SUBGRAPH_FIELDS: &str = r#"
    id
    name
    url
    createdAt
"#;

/// Outcome of the `subgraphCreate` mutation.
#[derive(Debug)]
enum SubgraphCreateOutcome {
    Success(Subgraph),
    BranchDoesNotExist,
    NameAlreadyExists,
    NameInvalid,
    Other(Value),
}

impl SubgraphCreateOutcome {
    fn decode(payload: Value) -> Self {
        #[derive(Deserialize)]
        struct Success {
            subgraph: Subgraph,
        }

        if let Ok(success) = serde_json::from_value::<Success>(payload.clone()) {
            if !success.subgraph.id.is_empty() {
                return Self::Success(success.subgraph);
            }
        }

        match payload.get("__typename").and_then(Value::as_str) {
            Some("BranchDoesNotExistError") => Self::BranchDoesNotExist,
            Some("NameAlreadyExistsError") => Self::NameAlreadyExists,
            Some("NameInvalidError") => Self::NameInvalid,
            _ => Self::Other(payload),
        }
    }

    fn into_result(self) -> Result<Subgraph, ApiError> {
        const OP: &str = "subgraph create";
        match self {
            Self::Success(subgraph) => Ok(subgraph),
            Self::BranchDoesNotExist => Err(ApiError::Rejected {
                operation: OP,
                detail: "BranchDoesNotExistError: branch does not exist".into(),
            }),
            Self::NameAlreadyExists => Err(ApiError::Rejected {
                operation: OP,
                detail: "NameAlreadyExistsError: a subgraph with this name already exists".into(),
            }),
            Self::NameInvalid => Err(ApiError::Rejected {
                operation: OP,
                detail: "NameInvalidError: subgraph name is not valid".into(),
            }),
            Self::Other(payload) => Err(ApiError::unexpected_payload(OP, &payload)),
        }
    }
}

/// Create a subgraph on a branch.
pub async fn create_subgraph(
    client: &ApiClient,
    input: CreateSubgraphInput,
) -> Result<Subgraph, ApiError> {
    let query = format!(
        r#"
        mutation CreateSubgraph($input: SubgraphCreateInput!) {{
            subgraphCreate(input: $input) {{
                ... on SubgraphCreateSuccess {{
                    subgraph {{
                        {SUBGRAPH_FIELDS}
                    }}
                }}
                ... on BranchDoesNotExistError {{
                    __typename
                }}
                ... on NameAlreadyExistsError {{
                    __typename
                }}
                ... on NameInvalidError {{
                    __typename
                }}
            }}
        }}
        "#
    );

    tracing::debug!("creating subgraph {} on branch {}", input.subgraph_name, input.branch_id);

    let data = client.execute(&query, json!({ "input": input })).await?;
    let payload = data.get("subgraphCreate").cloned().unwrap_or(Value::Null);

    SubgraphCreateOutcome::decode(payload).into_result()
}

/// Look up a subgraph by branch id and name.
pub async fn get_subgraph(
    client: &ApiClient,
    branch_id: &str,
    name: &str,
) -> Result<Subgraph, ApiError> {
    let query = format!(
        r#"
        query GetSubgraph($branchId: ID!, $name: String!) {{
            subgraph(branchId: $branchId, name: $name) {{
                {SUBGRAPH_FIELDS}
            }}
        }}
        "#
    );

    tracing::debug!("fetching subgraph {name} on branch {branch_id}");

    let data = client
        .execute(&query, json!({ "branchId": branch_id, "name": name }))
        .await?;

    let subgraph: Option<Subgraph> =
        serde_json::from_value(data.get("subgraph").cloned().unwrap_or_default())
            .map_err(ApiError::Decode)?;

    subgraph.ok_or(ApiError::NotFound { kind: "subgraph" })
}

/// Update a subgraph's URL in place. The same tagged-union discipline as
/// create applies.
pub async fn update_subgraph(client: &ApiClient, id: &str, url: &str) -> Result<Subgraph, ApiError> {
    let query = format!(
        r#"
        mutation UpdateSubgraph($input: SubgraphUpdateInput!) {{
            subgraphUpdate(input: $input) {{
                ... on SubgraphUpdateSuccess {{
                    subgraph {{
                        {SUBGRAPH_FIELDS}
                    }}
                }}
                ... on SubgraphDoesNotExistError {{
                    __typename
                }}
            }}
        }}
        "#
    );

    tracing::debug!("updating subgraph {id}");

    let data = client
        .execute(&query, json!({ "input": { "id": id, "url": url } }))
        .await?;
    let payload = data.get("subgraphUpdate").cloned().unwrap_or(Value::Null);

    #[derive(Deserialize)]
    struct Success {
        subgraph: Subgraph,
    }

    if let Ok(success) = serde_json::from_value::<Success>(payload.clone()) {
        if !success.subgraph.id.is_empty() {
            return Ok(success.subgraph);
        }
    }

    match payload.get("__typename").and_then(Value::as_str) {
        Some("SubgraphDoesNotExistError") => Err(ApiError::NotFound { kind: "subgraph" }),
        _ => Err(ApiError::unexpected_payload("subgraph update", &payload)),
    }
}

const DELETE_SUBGRAPH: &str = r#"
    mutation DeleteSubgraph($input: SubgraphDeleteInput!) {
        subgraphDelete(input: $input) {
            ... on SubgraphDeleteSuccess {
                deletedId
            }
            ... on SubgraphDoesNotExistError {
                __typename
            }
        }
    }
"#;

/// Delete a subgraph by id. A does-not-exist result decodes to `NotFound`.
pub async fn delete_subgraph(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    tracing::debug!("deleting subgraph {id}");

    let data = client
        .execute(DELETE_SUBGRAPH, json!({ "input": { "id": id } }))
        .await?;
    let payload = data.get("subgraphDelete").cloned().unwrap_or(Value::Null);

    if payload
        .get("deletedId")
        .and_then(Value::as_str)
        .is_some_and(|deleted| !deleted.is_empty())
    {
        return Ok(());
    }

    match payload.get("__typename").and_then(Value::as_str) {
        Some("SubgraphDoesNotExistError") => Err(ApiError::NotFound { kind: "subgraph" }),
        _ => Err(ApiError::unexpected_payload("subgraph delete", &payload)),
    }
}
