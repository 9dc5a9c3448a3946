//! Backend-neutral Cypher statements.
//!
//! A [`Statement`] carries the Cypher text, its parameters, and the typed
//! columns it returns. [`GraphClient`](crate::GraphClient) turns it into a
//! `neo4rs::Query`; the recording store used in tests inspects it directly.

use tertulia_core::{PropertyKind, PropertyValue};

/// One result row, keyed by column name. Absent values are left out.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Whether a statement only reads or also writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A parameter value. Only values travel as parameters, never names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Integer(i64),
    TextList(Vec<String>),
}

impl From<&PropertyValue> for Param {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Text(s) => Param::Text(s.clone()),
            PropertyValue::Integer(i) => Param::Integer(*i),
        }
    }
}

/// Expected type of a returned column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    TextList,
}

impl From<PropertyKind> for ColumnKind {
    fn from(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Text => ColumnKind::Text,
            PropertyKind::Integer => ColumnKind::Integer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub cypher: String,
    pub params: Vec<(String, Param)>,
    pub columns: Vec<Column>,
    pub access: Access,
}

impl Statement {
    pub fn read(cypher: impl Into<String>) -> Self {
        Self::new(cypher, Access::Read)
    }

    pub fn write(cypher: impl Into<String>) -> Self {
        Self::new(cypher, Access::Write)
    }

    fn new(cypher: impl Into<String>, access: Access) -> Self {
        Self {
            cypher: cypher.into(),
            params: Vec::new(),
            columns: Vec::new(),
            access,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: Param) -> Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push(Column::new(name, kind));
        self
    }

    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// Quote a registry-supplied identifier for Cypher (`añoPublicacion` needs it).
pub(crate) fn quoted(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
