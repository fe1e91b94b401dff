//! graphplane — declarative resource management for the Graphplane platform
//!
//! Manages three hierarchical remote resources — graphs, branches, and
//! subgraphs — against the platform's GraphQL API: create, read, update
//! (subgraph URL only), delete, and import of pre-existing entities.
//!
//! The [`api`] module is the typed client surface; [`provider`] binds it to a
//! declarative lifecycle a host runtime (or the bundled CLI) drives.

pub mod api;
pub mod config;
pub mod provider;
