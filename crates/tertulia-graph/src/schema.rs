//! Neo4j schema initialization (constraints and indexes).

use tertulia_core::types::CSV_ID;
use tertulia_core::Label;

use crate::client::{GraphError, LibraryGraph};
use crate::statement::{quoted, Statement};

/// Uniqueness constraints on each natural identifier, plus a `csvId`
/// index per label for bulk-load matching. All `IF NOT EXISTS`.
pub fn schema_statements() -> Vec<Statement> {
    let constraints = Label::ALL.into_iter().map(|label| {
        let var = label.as_str().to_lowercase();
        Statement::write(format!(
            "CREATE CONSTRAINT {var}_{id_snake} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{id} IS UNIQUE",
            id_snake = label.identifier().name.to_lowercase(),
            label = label.as_str(),
            id = quoted(label.identifier().name),
        ))
    });

    let indexes = Label::ALL.into_iter().map(|label| {
        Statement::write(format!(
            "CREATE INDEX {var}_csv_id IF NOT EXISTS FOR (n:{label}) ON (n.{CSV_ID})",
            var = label.as_str().to_lowercase(),
            label = label.as_str(),
        ))
    });

    constraints.chain(indexes).collect()
}

impl LibraryGraph {
    /// Create constraints and indexes. Safe to run repeatedly.
    pub async fn initialize_schema(&self) -> Result<(), GraphError> {
        let statements = schema_statements();
        for statement in &statements {
            self.store().write(statement).await?;
        }
        tracing::info!(statements = statements.len(), "Neo4j schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements() {
        let statements = schema_statements();
        assert_eq!(statements.len(), 8);
        assert_eq!(
            statements[0].cypher,
            "CREATE CONSTRAINT persona_nombrecompleto IF NOT EXISTS FOR (n:Persona) REQUIRE n.`nombreCompleto` IS UNIQUE"
        );
        assert!(statements
            .iter()
            .any(|s| s.cypher.contains("FOR (n:Club) REQUIRE n.`nombre` IS UNIQUE")));
        assert_eq!(
            statements[7].cypher,
            "CREATE INDEX club_csv_id IF NOT EXISTS FOR (n:Club) ON (n.csvId)"
        );
        assert!(statements.iter().all(|s| s.params.is_empty()));
    }
}
