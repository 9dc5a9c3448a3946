//! Write operations for the book-club graph.
//!
//! Interactive writes address nodes by their natural identifier. Bulk
//! CSV writes use MERGE (upsert) semantics so a file can be loaded more
//! than once: on the natural identifier when the row carries it, stamping
//! `csvId` onto that node, and on `csvId` alone otherwise.
//! Relationships are always MERGEd: creating one twice is a no-op.

use tertulia_core::types::CSV_ID;
use tertulia_core::{Properties, RelationKind};

use crate::client::{GraphError, LibraryGraph};
use crate::statement::{quoted, ColumnKind, Param, Record, Statement};

/// Result of an interactive update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The statement ran; `matched` nodes were updated.
    Applied { matched: i64 },
    /// Nothing left to set once the identifier was dropped; nothing was sent.
    NoChanges,
}

// ── Statement Builders ───────────────────────────────────────────

/// `SET` clause over registry names, with values bound as `$v0`, `$v1`, ...
fn with_set_clause(mut stmt: Statement, cypher_prefix: &str, props: &Properties) -> Statement {
    let mut assignments = Vec::with_capacity(props.len());
    for (i, (name, value)) in props.iter().enumerate() {
        let param = format!("v{i}");
        assignments.push(format!("n.{} = ${param}", quoted(name)));
        stmt = stmt.param(param, Param::from(value));
    }
    stmt.cypher = if assignments.is_empty() {
        cypher_prefix.to_string()
    } else {
        format!("{cypher_prefix} SET {}", assignments.join(", "))
    };
    stmt
}

/// Create one node with exactly the supplied properties.
pub fn create_statement(props: &Properties) -> Statement {
    let prefix = format!("CREATE (n:{})", props.label().as_str());
    with_set_clause(Statement::write(""), &prefix, props)
}

/// Update the node matched by its natural identifier.
///
/// The identifier property is dropped from the payload; `None` when
/// nothing else remains.
pub fn update_statement(identifier: &str, mut props: Properties) -> Option<Statement> {
    let label = props.label();
    props.remove(label.identifier().name);
    if props.is_empty() {
        return None;
    }

    let prefix = format!(
        "MATCH (n:{label} {{{id}: $identifier}})",
        label = label.as_str(),
        id = quoted(label.identifier().name),
    );
    let stmt = Statement::write("").param("identifier", Param::Text(identifier.to_string()));
    let mut stmt = with_set_clause(stmt, &prefix, &props);
    stmt.cypher.push_str(" RETURN count(n) AS matched");
    Some(stmt.column("matched", ColumnKind::Integer))
}

/// Link one source to many targets, all matched by natural identifier, in one statement.
pub fn relate_statement(kind: RelationKind, from: &str, to: &[String]) -> Statement {
    let source = kind.source();
    let target = kind.target();
    let cypher = format!(
        "MATCH (a:{src} {{{src_id}: $from}})
         UNWIND $to AS target_id
         MATCH (b:{tgt} {{{tgt_id}: target_id}})
         MERGE (a)-[:{rel}]->(b)
         RETURN count(b) AS linked",
        src = source.as_str(),
        src_id = quoted(source.identifier().name),
        tgt = target.as_str(),
        tgt_id = quoted(target.identifier().name),
        rel = kind.rel_type(),
    );

    Statement::write(cypher)
        .param("from", Param::Text(from.to_string()))
        .param("to", Param::TextList(to.to_vec()))
        .column("linked", ColumnKind::Integer)
}

/// Upsert one CSV row.
///
/// A row carrying the natural identifier merges onto the node the HTTP API
/// addresses and records `csvId` on it.
pub fn csv_upsert_statement(csv_id: i64, props: &Properties) -> Statement {
    let label = props.label();
    let identifier = label.identifier().name;
    let stmt = Statement::write("").param("csv_id", Param::Integer(csv_id));

    match props.get(identifier) {
        Some(value) => {
            let prefix = format!(
                "MERGE (n:{label} {{{id}: $identifier}}) SET n.{CSV_ID} = $csv_id",
                label = label.as_str(),
                id = quoted(identifier),
            );
            let mut rest = props.clone();
            rest.remove(identifier);
            with_set_clause(stmt.param("identifier", Param::from(value)), &prefix, &rest)
        }
        None => {
            let prefix = format!("MERGE (n:{label} {{{CSV_ID}: $csv_id}})", label = label.as_str());
            with_set_clause(stmt, &prefix, props)
        }
    }
}

/// Link two nodes matched by their CSV surrogate ids.
pub fn csv_link_statement(kind: RelationKind, source_id: i64, target_id: i64) -> Statement {
    let cypher = format!(
        "MATCH (a:{src} {{{key}: $source_id}})
         MATCH (b:{tgt} {{{key}: $target_id}})
         MERGE (a)-[:{rel}]->(b)
         RETURN count(*) AS linked",
        src = kind.source().as_str(),
        tgt = kind.target().as_str(),
        key = CSV_ID,
        rel = kind.rel_type(),
    );

    Statement::write(cypher)
        .param("source_id", Param::Integer(source_id))
        .param("target_id", Param::Integer(target_id))
        .column("linked", ColumnKind::Integer)
}

fn count_column(records: &[Record], column: &str) -> i64 {
    records
        .first()
        .and_then(|r| r.get(column))
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
}

// ── Write Operations ─────────────────────────────────────────────

impl LibraryGraph {
    /// Create one node with exactly the supplied properties.
    pub async fn create_node(&self, props: &Properties) -> Result<(), GraphError> {
        self.store().write(&create_statement(props)).await?;
        tracing::info!(label = %props.label(), properties = props.len(), "Created node");
        Ok(())
    }

    /// Update a node addressed by its natural identifier.
    pub async fn update_node(
        &self,
        identifier: &str,
        props: Properties,
    ) -> Result<UpdateOutcome, GraphError> {
        let label = props.label();
        let Some(stmt) = update_statement(identifier, props) else {
            tracing::debug!(%label, identifier, "Update payload empty, nothing sent");
            return Ok(UpdateOutcome::NoChanges);
        };

        let matched = count_column(&self.store().write(&stmt).await?, "matched");
        if matched == 0 {
            tracing::warn!(%label, identifier, "Update matched no node");
        }
        Ok(UpdateOutcome::Applied { matched })
    }

    /// MERGE `kind` relationships from one source to each target.
    ///
    /// Unmatched endpoints are skipped; returns how many targets were linked.
    pub async fn relate(
        &self,
        kind: RelationKind,
        from: &str,
        to: &[String],
    ) -> Result<i64, GraphError> {
        let stmt = relate_statement(kind, from, to);
        let linked = count_column(&self.store().write(&stmt).await?, "linked");
        tracing::info!(
            relation = %kind,
            from,
            requested = to.len(),
            linked,
            "Merged relationships"
        );
        Ok(linked)
    }

    /// Upsert a node keyed by its CSV surrogate id.
    pub async fn upsert_by_csv_id(
        &self,
        csv_id: i64,
        props: &Properties,
    ) -> Result<(), GraphError> {
        self.store().write(&csv_upsert_statement(csv_id, props)).await?;
        Ok(())
    }

    /// Link two nodes by CSV surrogate ids. Returns false when either endpoint is missing.
    pub async fn link_by_csv_id(
        &self,
        kind: RelationKind,
        source_id: i64,
        target_id: i64,
    ) -> Result<bool, GraphError> {
        let stmt = csv_link_statement(kind, source_id, target_id);
        Ok(count_column(&self.store().write(&stmt).await?, "linked") > 0)
    }
}
