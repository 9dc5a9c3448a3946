//! Application state.

use tertulia_graph::LibraryGraph;
use tertulia_ingest::BulkLoader;

use crate::error::{ApiError, Result};

/// Shared across handlers. Without a graph every data endpoint answers 500.
#[derive(Clone)]
pub struct AppState {
    graph: Option<LibraryGraph>,
    loader: Option<BulkLoader>,
}

impl AppState {
    pub fn connected(graph: LibraryGraph) -> Self {
        Self {
            loader: Some(BulkLoader::new(graph.clone())),
            graph: Some(graph),
        }
    }

    /// State for a server whose database was unreachable at start-up.
    pub fn unavailable() -> Self {
        Self {
            graph: None,
            loader: None,
        }
    }

    pub fn graph(&self) -> Result<&LibraryGraph> {
        self.graph.as_ref().ok_or(ApiError::Unavailable)
    }

    pub fn loader(&self) -> Result<&BulkLoader> {
        self.loader.as_ref().ok_or(ApiError::Unavailable)
    }
}
