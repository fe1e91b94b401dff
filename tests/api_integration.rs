//! Integration tests for the GraphQL API client using wiremock
//!
//! A mock server stands in for the platform endpoint so every transport and
//! decoding branch can be exercised: HTTP status failures, malformed bodies,
//! GraphQL error arrays, tagged-union mutation payloads, and the structured
//! not-found sentinel.

use graphplane::api::branch::{self, BranchEnvironment, CreateBranchInput, DeleteBranchInput};
use graphplane::api::client::ApiClient;
use graphplane::api::error::ApiError;
use graphplane::api::graph::{self, CreateGraphInput};
use graphplane::api::subgraph::{self, CreateSubgraphInput};
use graphplane::api::account;
use serde_json::json;
use wiremock::matchers::{bearer_token, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_url("test-key", format!("{}/graphql", server.uri())).unwrap()
}

mod transport {
    use super::*;

    #[tokio::test]
    async fn execute_sends_bearer_token_and_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(bearer_token("test-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "ok": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let data = client.execute("query { ok }", json!(null)).await.unwrap();
        assert_eq!(data["ok"], true);
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.execute("query { ok }", json!(null)).await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected Status error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn multibyte_error_body_survives_error_logging() {
        let server = MockServer::start().await;

        // 'é' straddles the log truncation point at byte 200.
        let body = format!("{}é{}", "a".repeat(199), "b".repeat(100));
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(500).set_body_string(body.clone()))
            .mount(&server)
            .await;

        // Install a subscriber so the error log line is actually rendered.
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_writer(std::io::sink)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = client_for(&server).await;
        let err = client.execute("query { ok }", json!(null)).await.unwrap_err();

        match err {
            ApiError::Status { status, body: got } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(got, body);
            }
            other => panic!("expected Status error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.execute("query { ok }", json!(null)).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn errors_array_fails_even_with_well_formed_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "graphByAccountSlug": { "id": "graph_1" } },
                "errors": [
                    { "message": "field deprecated" },
                    { "message": "rate limited" }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.execute("query { x }", json!(null)).await.unwrap_err();

        match err {
            ApiError::GraphQl { errors, data } => {
                assert_eq!(errors.len(), 2);
                assert!(data.is_some(), "partial data should ride along");
            }
            other => panic!("expected GraphQl error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Nothing is listening on this port.
        let client = ApiClient::with_url("test-key", "http://127.0.0.1:9/graphql").unwrap();
        let err = client.execute("query { ok }", json!(null)).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

mod accounts {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_account() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("accountBySlug"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "accountBySlug": { "id": "acc_1", "slug": "my-account", "name": "My Account" }
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let acct = account::account_by_slug(&client, "my-account").await.unwrap();
        assert_eq!(acct.id, "acc_1");
        assert_eq!(acct.name, "My Account");
    }

    #[tokio::test]
    async fn null_lookup_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "accountBySlug": null }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = account::account_by_slug(&client, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

mod graphs {
    use super::*;

    fn graph_body() -> serde_json::Value {
        json!({
            "id": "graph_123",
            "slug": "my-graph",
            "createdAt": "2024-06-01T12:00:00Z",
            "account": { "id": "acc_1", "slug": "my-account", "name": "My Account" }
        })
    }

    #[tokio::test]
    async fn create_decodes_success_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("graphCreate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "graphCreate": { "graph": graph_body() } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let graph = graph::create_graph(
            &client,
            CreateGraphInput {
                account_id: "acc_1".into(),
                graph_slug: "my-graph".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(graph.id, "graph_123");
        assert_eq!(graph.account.slug, "my-account");
    }

    #[tokio::test]
    async fn create_surfaces_tagged_failure_variant() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "graphCreate": { "__typename": "SlugAlreadyExistsError" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = graph::create_graph(
            &client,
            CreateGraphInput {
                account_id: "acc_1".into(),
                graph_slug: "taken".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(&err, ApiError::Rejected { .. }));
        assert!(err.to_string().contains("SlugAlreadyExistsError"));
    }

    #[tokio::test]
    async fn get_by_id_ignores_foreign_node_kinds() {
        let server = MockServer::start().await;

        // A node of another kind decodes to an empty fragment.
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "node": {} }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = graph::get_graph_by_id(&client, "branch_42").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_by_id_decodes_graph_node() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "node": graph_body() }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let graph = graph::get_graph_by_id(&client, "graph_123").await.unwrap();
        assert_eq!(graph.slug, "my-graph");
    }

    #[tokio::test]
    async fn delete_success_carries_deleted_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("graphDelete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "graphDelete": { "deletedId": "graph_123" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        graph::delete_graph(&client, "graph_123").await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_missing_graph_is_structured_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "graphDelete": { "__typename": "GraphDoesNotExistError" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = graph::delete_graph(&client, "graph_zzz").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

mod branches {
    use super::*;

    fn branch_body() -> serde_json::Value {
        json!({
            "id": "branch_42",
            "name": "main",
            "environment": "PRODUCTION",
            "operationChecksEnabled": true,
            "operationChecksIgnoreUsageData": false,
            "createdAt": "2024-06-02T08:30:00Z",
            "graph": { "id": "graph_123", "slug": "my-graph" }
        })
    }

    #[tokio::test]
    async fn create_decodes_query_projection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("branchCreate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "branchCreate": { "branch": branch_body() } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let created = branch::create_branch(
            &client,
            CreateBranchInput {
                account_slug: "my-account".into(),
                graph_slug: "my-graph".into(),
                branch_name: "main".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.id, "branch_42");
        assert_eq!(created.environment, BranchEnvironment::Production);
        assert_eq!(created.graph.slug, "my-graph");
    }

    #[tokio::test]
    async fn get_null_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "branch": null }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = branch::get_branch(&client, "my-account", "my-graph", "gone")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_query_projection_is_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("branchDelete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "branchDelete": { "__typename": "Query" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        branch::delete_branch(
            &client,
            DeleteBranchInput {
                account_slug: "my-account".into(),
                graph_slug: "my-graph".into(),
                branch_name: "preview-1".into(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn production_branch_deletion_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "branchDelete": { "__typename": "CannotDeleteProductionBranchError" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = branch::delete_branch(
            &client,
            DeleteBranchInput {
                account_slug: "my-account".into(),
                graph_slug: "my-graph".into(),
                branch_name: "main".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(!err.is_not_found());
        assert!(err.to_string().contains("CannotDeleteProductionBranchError"));
    }
}

mod subgraphs {
    use super::*;

    fn subgraph_body(url: &str) -> serde_json::Value {
        json!({
            "id": "sub_7",
            "name": "reviews",
            "url": url,
            "createdAt": "2024-06-03T09:00:00Z"
        })
    }

    #[tokio::test]
    async fn create_decodes_success_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("subgraphCreate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "subgraphCreate": { "subgraph": subgraph_body("https://reviews.internal/graphql") } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let created = subgraph::create_subgraph(
            &client,
            CreateSubgraphInput {
                branch_id: "branch_42".into(),
                subgraph_name: "reviews".into(),
                url: "https://reviews.internal/graphql".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.id, "sub_7");
        assert_eq!(created.url, "https://reviews.internal/graphql");
    }

    #[tokio::test]
    async fn update_returns_new_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("subgraphUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "subgraphUpdate": { "subgraph": subgraph_body("https://v2.internal/graphql") } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let updated = subgraph::update_subgraph(&client, "sub_7", "https://v2.internal/graphql")
            .await
            .unwrap();
        assert_eq!(updated.url, "https://v2.internal/graphql");
    }

    #[tokio::test]
    async fn update_of_missing_subgraph_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "subgraphUpdate": { "__typename": "SubgraphDoesNotExistError" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = subgraph::update_subgraph(&client, "sub_zzz", "https://x.internal/graphql")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_success_carries_deleted_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("subgraphDelete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "subgraphDelete": { "deletedId": "sub_7" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        subgraph::delete_subgraph(&client, "sub_7").await.unwrap();
    }
}
