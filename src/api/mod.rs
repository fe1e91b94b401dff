//! Graphplane API interaction module
//!
//! This module provides the typed surface over the platform's single GraphQL
//! endpoint: the transport client, the error taxonomy, and one set of
//! operations per entity kind.
//!
//! # Module Structure
//!
//! - [`client`] - GraphQL-over-HTTP transport
//! - [`error`] - structured error classification
//! - [`account`] - account lookup (read-only parent of graphs)
//! - [`graph`] - graph create/get/get-by-id/delete
//! - [`branch`] - branch create/get/delete
//! - [`subgraph`] - subgraph create/get/update/delete
//!
//! # Example
//!
//! ```ignore
//! use graphplane::api::{client::ApiClient, graph};
//!
//! async fn example() -> Result<(), graphplane::api::error::ApiError> {
//!     let client = ApiClient::new("gp_api_key")?;
//!     let graph = graph::get_graph(&client, "my-account", "my-graph").await?;
//!     println!("{} created at {}", graph.slug, graph.created_at);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod branch;
pub mod client;
pub mod error;
pub mod graph;
pub mod subgraph;
