//! Read operations: label listing and the fixed analytics reports.

use serde::{Deserialize, Serialize};
use tertulia_core::Label;

use crate::client::{GraphError, LibraryGraph};
use crate::statement::{quoted, ColumnKind, Param, Record, Statement};

/// Minimum number of club-recommended books a person must have read.
pub const RECOMMENDED_READ_THRESHOLD: i64 = 3;

/// Number of books returned by the popularity report.
pub const POPULAR_BOOKS_LIMIT: i64 = 3;

/// A book read by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRead {
    pub titulo: Option<String>,
    pub genero: Option<String>,
}

/// A member of a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubMember {
    pub nombre: Option<String>,
}

/// A person who has read enough books recommended by one of their clubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedReader {
    pub persona: Option<String>,
    pub club: Option<String>,
}

/// A person belonging to several clubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiClubMember {
    pub persona: Option<String>,
    #[serde(default)]
    pub clubes: Vec<String>,
}

/// A book with its reader count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularBook {
    pub titulo: Option<String>,
    pub lectores: i64,
}

// ── Statement Builders ───────────────────────────────────────────

/// All nodes of a label, projecting the registered properties, ordered by identifier.
pub fn list_statement(label: Label) -> Statement {
    let projection = label
        .properties()
        .iter()
        .map(|p| format!("n.{name} AS {name}", name = quoted(p.name)))
        .collect::<Vec<_>>()
        .join(", ");

    let cypher = format!(
        "MATCH (n:{label}) RETURN {projection} ORDER BY n.{id} ASC",
        label = label.as_str(),
        id = quoted(label.identifier().name),
    );

    label
        .properties()
        .iter()
        .fold(Statement::read(cypher), |stmt, p| stmt.column(p.name, p.kind.into()))
}

pub fn books_read_statement(persona: &str) -> Statement {
    Statement::read(
        "MATCH (p:Persona {nombreCompleto: $nombre})-[:LEE]->(l:Libro)
         RETURN l.titulo AS titulo, l.generoLiterario AS genero",
    )
    .param("nombre", Param::Text(persona.to_string()))
    .column("titulo", ColumnKind::Text)
    .column("genero", ColumnKind::Text)
}

pub fn club_members_statement(club: &str) -> Statement {
    Statement::read(
        "MATCH (p:Persona)-[:PERTENECE_A]->(c:Club {nombre: $nombre})
         RETURN p.nombreCompleto AS nombre",
    )
    .param("nombre", Param::Text(club.to_string()))
    .column("nombre", ColumnKind::Text)
}

pub fn recommended_readers_statement() -> Statement {
    Statement::read(
        "MATCH (p:Persona)-[:PERTENECE_A]->(c:Club)-[:RECOMIENDA]->(l:Libro)<-[:LEE]-(p)
         WITH p, c, count(DISTINCT l) AS leidos
         WHERE leidos >= $umbral
         RETURN p.nombreCompleto AS persona, c.nombre AS club",
    )
    .param("umbral", Param::Integer(RECOMMENDED_READ_THRESHOLD))
    .column("persona", ColumnKind::Text)
    .column("club", ColumnKind::Text)
}

pub fn multi_club_members_statement() -> Statement {
    Statement::read(
        "MATCH (p:Persona)-[:PERTENECE_A]->(c:Club)
         WITH p, count(DISTINCT c) AS total, collect(c.nombre) AS clubes
         WHERE total > 1
         RETURN p.nombreCompleto AS persona, clubes",
    )
    .column("persona", ColumnKind::Text)
    .column("clubes", ColumnKind::TextList)
}

/// Ties between equal reader counts come back in engine order.
pub fn popular_books_statement() -> Statement {
    Statement::read(
        "MATCH (p:Persona)-[:LEE]->(l:Libro)
         RETURN l.titulo AS titulo, count(p) AS lectores
         ORDER BY lectores DESC
         LIMIT $limite",
    )
    .param("limite", Param::Integer(POPULAR_BOOKS_LIMIT))
    .column("titulo", ColumnKind::Text)
    .column("lectores", ColumnKind::Integer)
}

// ── Read Operations ──────────────────────────────────────────────

impl LibraryGraph {
    /// List every node of a label.
    pub async fn list_nodes(&self, label: Label) -> Result<Vec<Record>, GraphError> {
        self.store().read(&list_statement(label)).await
    }

    /// Books read by the named person, with genre.
    pub async fn books_read_by(&self, persona: &str) -> Result<Vec<BookRead>, GraphError> {
        self.read_as(&books_read_statement(persona)).await
    }

    /// People belonging to the named club.
    pub async fn club_members(&self, club: &str) -> Result<Vec<ClubMember>, GraphError> {
        self.read_as(&club_members_statement(club)).await
    }

    /// People who read at least three books recommended by a club they belong to.
    pub async fn recommended_readers(&self) -> Result<Vec<RecommendedReader>, GraphError> {
        self.read_as(&recommended_readers_statement()).await
    }

    /// People belonging to more than one club, with all their club names.
    pub async fn multi_club_members(&self) -> Result<Vec<MultiClubMember>, GraphError> {
        self.read_as(&multi_club_members_statement()).await
    }

    /// The three most-read books.
    pub async fn popular_books(&self) -> Result<Vec<PopularBook>, GraphError> {
        self.read_as(&popular_books_statement()).await
    }

    async fn read_as<T: serde::de::DeserializeOwned>(
        &self,
        statement: &Statement,
    ) -> Result<Vec<T>, GraphError> {
        let records = self.store().read(statement).await?;
        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(serde_json::Value::Object(record))
                    .map_err(|e| GraphError::Serialization(format!("Failed to decode row: {e}")))
            })
            .collect()
    }
}
