//! Neo4j connection management and the shared graph seam.

use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query};
use serde::Deserialize;
use serde_json::Value;

use crate::statement::{Access, Column, ColumnKind, Param, Record, Statement};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
///
/// Loaded from the `[neo4j]` section of `tertulia.toml` or
/// `TERTULIA__NEO4J__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "tertulia-dev".to_string(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Executes statements against a graph backend.
///
/// Reads run as auto-commit queries; writes run in their own write
/// transaction. Both return the rows projected by `Statement::columns`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn read(&self, statement: &Statement) -> Result<Vec<Record>, GraphError>;

    async fn write(&self, statement: &Statement) -> Result<Vec<Record>, GraphError>;
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc). Each call checks a connection out of the
/// pool for its own duration only.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j and verify the server answers.
    ///
    /// `Graph::connect` only builds the pool, so a `RETURN 1` ping forces a
    /// real handshake and surfaces an unreachable server here.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn read(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        debug_assert_eq!(statement.access, Access::Read);
        let mut stream = self.graph.execute(to_query(statement)).await?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            records.push(row_to_record(&row, &statement.columns));
        }
        Ok(records)
    }

    async fn write(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        let mut txn = self.graph.start_txn().await?;
        let mut stream = txn.execute(to_query(statement)).await?;
        let mut records = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            records.push(row_to_record(&row, &statement.columns));
        }
        txn.commit().await?;
        Ok(records)
    }
}

fn to_query(statement: &Statement) -> Query {
    let mut q = query(&statement.cypher);
    for (name, value) in &statement.params {
        q = match value {
            Param::Text(s) => q.param(name, s.clone()),
            Param::Integer(i) => q.param(name, *i),
            Param::TextList(items) => q.param(name, items.clone()),
        };
    }
    q
}

/// Project a neo4rs row onto the statement's columns. Nulls are left out.
fn row_to_record(row: &neo4rs::Row, columns: &[Column]) -> Record {
    let mut record = Record::new();
    for column in columns {
        let name = column.name.as_str();
        let value = match column.kind {
            ColumnKind::Text => row
                .get::<String>(name)
                .ok()
                .map(Value::String)
                .or_else(|| row.get::<i64>(name).ok().map(|i| Value::String(i.to_string()))),
            // Interactive creates may have stored a numeric property as text.
            ColumnKind::Integer => row
                .get::<i64>(name)
                .ok()
                .map(Value::from)
                .or_else(|| row.get::<String>(name).ok().map(Value::String)),
            ColumnKind::TextList => row.get::<Vec<String>>(name).ok().map(Value::from),
        };
        if let Some(value) = value {
            record.insert(name.to_string(), value);
        }
    }
    record
}

/// The book-club graph: registries, statement builders, and a store.
///
/// Read operations live in [`queries`](crate::queries), writes in
/// [`mutations`](crate::mutations).
#[derive(Clone)]
pub struct LibraryGraph {
    store: Arc<dyn GraphStore>,
}

impl LibraryGraph {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn from_client(client: GraphClient) -> Self {
        Self::new(Arc::new(client))
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }
}
