//! Accounts
//!
//! Accounts are read-only from this crate's point of view: graphs are created
//! under an account, so creating one starts with a slug lookup here.

use super::client::ApiClient;
use super::error::ApiError;
use serde::Deserialize;
use serde_json::json;

/// A Graphplane account.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub slug: String,
    pub name: String,
}

const GET_ACCOUNT: &str = r#"
    query GetAccount($slug: String!) {
        accountBySlug(slug: $slug) {
            id
            slug
            name
        }
    }
"#;

/// Look up an account by slug. A null result is `ApiError::NotFound`.
pub async fn account_by_slug(client: &ApiClient, slug: &str) -> Result<Account, ApiError> {
    tracing::debug!("fetching account {slug}");

    let data = client.execute(GET_ACCOUNT, json!({ "slug": slug })).await?;

    let account: Option<Account> = serde_json::from_value(
        data.get("accountBySlug").cloned().unwrap_or_default(),
    )
    .map_err(ApiError::Decode)?;

    account.ok_or(ApiError::NotFound { kind: "account" })
}
