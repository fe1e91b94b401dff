//! Graphs
//!
//! A graph is the top-level container for a federated schema, owned by an
//! account and identified by a slug unique within it. Mutation results are
//! tagged unions: the success shape is tried first (a non-empty id on the
//! nested graph confirms it), then the payload's `__typename` decides which
//! named failure it is.

use super::account::Account;
use super::client::ApiClient;
use super::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A Graphplane graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub account: Account,
}

/// Input for creating a graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraphInput {
    pub account_id: String,
    pub graph_slug: String,
}

const GRAPH_FIELDS: &str = r#"
    id
    slug
    createdAt
    account {
        id
        slug
        name
    }
"#;

/// Outcome of the `graphCreate` mutation.
#[derive(Debug)]
enum GraphCreateOutcome {
    Success(Graph),
    AccountDoesNotExist,
    DisabledAccount,
    SlugAlreadyExists,
    SlugInvalid,
    SlugTooLong { max_length: Option<u64> },
    Other(Value),
}

impl GraphCreateOutcome {
    fn decode(payload: Value) -> Self {
        #[derive(Deserialize)]
        struct Success {
            graph: Graph,
        }

        // Success shape first; the remote does not reliably include a
        // discriminator on it.
        if let Ok(success) = serde_json::from_value::<Success>(payload.clone()) {
            if !success.graph.id.is_empty() {
                return Self::Success(success.graph);
            }
        }

        match payload.get("__typename").and_then(Value::as_str) {
            Some("AccountDoesNotExistError") => Self::AccountDoesNotExist,
            Some("DisabledAccountError") => Self::DisabledAccount,
            Some("SlugAlreadyExistsError") => Self::SlugAlreadyExists,
            Some("SlugInvalidError") => Self::SlugInvalid,
            Some("SlugTooLongError") => Self::SlugTooLong {
                max_length: payload.get("maxLength").and_then(Value::as_u64),
            },
            _ => Self::Other(payload),
        }
    }

    fn into_result(self) -> Result<Graph, ApiError> {
        const OP: &str = "graph create";
        match self {
            Self::Success(graph) => Ok(graph),
            Self::AccountDoesNotExist => Err(ApiError::Rejected {
                operation: OP,
                detail: "AccountDoesNotExistError: account does not exist".into(),
            }),
            Self::DisabledAccount => Err(ApiError::Rejected {
                operation: OP,
                detail: "DisabledAccountError: account is disabled".into(),
            }),
            Self::SlugAlreadyExists => Err(ApiError::Rejected {
                operation: OP,
                detail: "SlugAlreadyExistsError: a graph with this slug already exists".into(),
            }),
            Self::SlugInvalid => Err(ApiError::Rejected {
                operation: OP,
                detail: "SlugInvalidError: slug is not valid".into(),
            }),
            Self::SlugTooLong { max_length } => Err(ApiError::Rejected {
                operation: OP,
                detail: match max_length {
                    Some(max) => format!("SlugTooLongError: slug exceeds {max} characters"),
                    None => "SlugTooLongError: slug is too long".into(),
                },
            }),
            Self::Other(payload) => Err(ApiError::unexpected_payload(OP, &payload)),
        }
    }
}

/// Create a graph under an account.
pub async fn create_graph(client: &ApiClient, input: CreateGraphInput) -> Result<Graph, ApiError> {
    let query = format!(
        r#"
        mutation CreateGraph($input: GraphCreateInput!) {{
            graphCreate(input: $input) {{
                ... on GraphCreateSuccess {{
                    graph {{
                        {GRAPH_FIELDS}
                    }}
                }}
                ... on AccountDoesNotExistError {{
                    __typename
                }}
                ... on DisabledAccountError {{
                    __typename
                }}
                ... on SlugAlreadyExistsError {{
                    __typename
                }}
                ... on SlugInvalidError {{
                    __typename
                }}
                ... on SlugTooLongError {{
                    __typename
                    maxLength
                }}
            }}
        }}
        "#
    );

    tracing::debug!("creating graph {}", input.graph_slug);

    let data = client.execute(&query, json!({ "input": input })).await?;
    let payload = data.get("graphCreate").cloned().unwrap_or(Value::Null);

    GraphCreateOutcome::decode(payload).into_result()
}

/// Look up a graph by account slug and graph slug.
pub async fn get_graph(
    client: &ApiClient,
    account_slug: &str,
    graph_slug: &str,
) -> Result<Graph, ApiError> {
    let query = format!(
        r#"
        query GetGraph($accountSlug: String!, $graphSlug: String!) {{
            graphByAccountSlug(accountSlug: $accountSlug, graphSlug: $graphSlug) {{
                {GRAPH_FIELDS}
            }}
        }}
        "#
    );

    tracing::debug!("fetching graph {account_slug}/{graph_slug}");

    let data = client
        .execute(
            &query,
            json!({ "accountSlug": account_slug, "graphSlug": graph_slug }),
        )
        .await?;

    let graph: Option<Graph> = serde_json::from_value(
        data.get("graphByAccountSlug").cloned().unwrap_or_default(),
    )
    .map_err(ApiError::Decode)?;

    graph.ok_or(ApiError::NotFound { kind: "graph" })
}

/// Look up a graph by its raw id via the polymorphic `node` query. A null
/// node, or a node of another kind, is `NotFound`.
pub async fn get_graph_by_id(client: &ApiClient, id: &str) -> Result<Graph, ApiError> {
    let query = format!(
        r#"
        query GetGraphById($id: ID!) {{
            node(id: $id) {{
                ... on Graph {{
                    {GRAPH_FIELDS}
                }}
            }}
        }}
        "#
    );

    tracing::debug!("fetching graph by id {id}");

    let data = client.execute(&query, json!({ "id": id })).await?;

    // A node of a different kind decodes to an empty fragment; treat both
    // null and non-graph nodes as absent.
    let graph = data
        .get("node")
        .filter(|node| node.get("id").and_then(Value::as_str).is_some())
        .cloned();

    match graph {
        Some(node) => serde_json::from_value(node).map_err(ApiError::Decode),
        None => Err(ApiError::NotFound { kind: "graph" }),
    }
}

const DELETE_GRAPH: &str = r#"
    mutation DeleteGraph($input: GraphDeleteInput!) {
        graphDelete(input: $input) {
            ... on GraphDeleteSuccess {
                deletedId
            }
            ... on GraphDoesNotExistError {
                __typename
            }
        }
    }
"#;

/// Delete a graph by id. A does-not-exist result decodes to `NotFound` so
/// callers can treat it as already deleted.
pub async fn delete_graph(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    tracing::debug!("deleting graph {id}");

    let data = client
        .execute(DELETE_GRAPH, json!({ "input": { "id": id } }))
        .await?;
    let payload = data.get("graphDelete").cloned().unwrap_or(Value::Null);

    if payload
        .get("deletedId")
        .and_then(Value::as_str)
        .is_some_and(|deleted| !deleted.is_empty())
    {
        return Ok(());
    }

    match payload.get("__typename").and_then(Value::as_str) {
        Some("GraphDoesNotExistError") => Err(ApiError::NotFound { kind: "graph" }),
        _ => Err(ApiError::unexpected_payload("graph delete", &payload)),
    }
}
