//! In-memory [`GraphStore`] that records statements and replays scripted rows.
//!
//! Enabled for this crate's unit tests and, through the `test-util`
//! feature, for downstream crates.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{GraphError, GraphStore};
use crate::statement::{Record, Statement};

type Scripted = Result<Vec<Record>, String>;

/// Records every statement it receives. Reads and writes pop scripted
/// responses in order and fall back to an empty result.
#[derive(Default)]
pub struct RecordingStore {
    statements: Mutex<Vec<Statement>>,
    reads: Mutex<VecDeque<Scripted>>,
    writes: Mutex<VecDeque<Scripted>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the rows returned by successive reads.
    pub fn with_reads(reads: Vec<Vec<serde_json::Value>>) -> Self {
        let store = Self::new();
        for rows in reads {
            store.push_read(rows);
        }
        store
    }

    pub fn push_read(&self, rows: Vec<serde_json::Value>) {
        lock(&self.reads).push_back(Ok(to_records(rows)));
    }

    pub fn push_write(&self, rows: Vec<serde_json::Value>) {
        lock(&self.writes).push_back(Ok(to_records(rows)));
    }

    /// Make the next write fail with a connection error.
    pub fn push_write_error(&self, message: &str) {
        lock(&self.writes).push_back(Err(message.to_string()));
    }

    /// Every statement received so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        lock(&self.statements).clone()
    }

    fn respond(&self, queue: &Mutex<VecDeque<Scripted>>, statement: &Statement) -> Scripted {
        lock(&self.statements).push(statement.clone());
        lock(queue).pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl GraphStore for RecordingStore {
    async fn read(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        self.respond(&self.reads, statement)
            .map_err(GraphError::Connection)
    }

    async fn write(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        self.respond(&self.writes, statement)
            .map_err(GraphError::Connection)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn to_records(rows: Vec<serde_json::Value>) -> Vec<Record> {
    rows.into_iter()
        .filter_map(|row| match row {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
