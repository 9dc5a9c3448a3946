//! Tertulia Graph: Neo4j client for the book-club graph.
//!
//! This crate is the single mutation point for the graph. Every Cypher
//! statement is built here from the closed registries in `tertulia-core`,
//! and all reads and writes flow through the [`GraphStore`] seam so the
//! HTTP layer and the bulk loader can run against a recording fake in tests.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod statement;

#[cfg(any(test, feature = "test-util"))]
pub mod recording;

pub use client::{GraphClient, GraphConfig, GraphError, GraphStore, LibraryGraph};
pub use statement::{Access, Column, ColumnKind, Param, Record, Statement};
