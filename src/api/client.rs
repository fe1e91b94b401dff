//! GraphQL transport client
//!
//! One request/response cycle per call against the platform's single GraphQL
//! endpoint: no retries, no pagination, no batching. The client is cheap to
//! clone and holds no request-level mutable state, so concurrent calls are
//! safe by construction.

use super::error::{ApiError, GraphQlError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default Graphplane API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.graphplane.dev/graphql";

/// Wall-clock bound on a whole call, connect included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging: truncate and strip non-printable
/// characters.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // Back off to a char boundary; slicing mid-character would panic on
        // multibyte UTF-8 bodies.
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..end],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

/// Graphplane API client
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ApiClient {
    /// Create a client against the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_url(api_key, DEFAULT_API_URL)
    }

    /// Create a client against an explicit endpoint (self-hosted installs,
    /// tests).
    pub fn with_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("graphplane/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Execute one GraphQL operation and return its `data` payload.
    ///
    /// A 200 response with a non-empty `errors` array fails even when `data`
    /// is partially populated; the partial data rides along in the error.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value, ApiError> {
        let variables = if variables.is_null() { None } else { Some(&variables) };
        let request = GraphQlRequest { query, variables };
        let body = serde_json::to_vec(&request).map_err(ApiError::Encode)?;

        tracing::debug!("POST {}", self.api_url);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking
            // sensitive data.
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(ApiError::Status { status, body: text });
        }

        let decoded: GraphQlResponse = serde_json::from_str(&text).map_err(ApiError::Decode)?;

        if !decoded.errors.is_empty() {
            tracing::error!(
                "GraphQL errors: {}",
                sanitize_for_log(
                    &decoded
                        .errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                )
            );
            return Err(ApiError::GraphQl {
                errors: decoded.errors,
                data: decoded.data,
            });
        }

        Ok(decoded.data.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated, 500 bytes total"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn sanitize_truncates_multibyte_bodies_on_char_boundary() {
        // 'é' is two bytes and straddles the truncation point.
        let body = format!("{}é{}", "a".repeat(199), "b".repeat(100));
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated, 301 bytes total"));
        assert!(sanitized.starts_with(&"a".repeat(199)));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        let sanitized = sanitize_for_log("ok\r\nline\ttab");
        assert_eq!(sanitized, "oklinetab");
    }
}
