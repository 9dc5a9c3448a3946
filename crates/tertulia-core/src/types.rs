//! Core domain types for the Tertulia knowledge graph.
//!
//! Both registries are closed: labels and relationship kinds are enums, and
//! every property name that can ever reach a Cypher statement is a
//! `&'static str` from the tables below.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ── Properties ────────────────────────────────────────────────────

/// Value kind of a registered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Text,
    Integer,
}

impl PropertyKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Integer => "an integer",
        }
    }
}

/// A property in a label's fixed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: PropertyKind,
}

const fn text(name: &'static str) -> PropertyDef {
    PropertyDef {
        name,
        kind: PropertyKind::Text,
    }
}

const fn integer(name: &'static str) -> PropertyDef {
    PropertyDef {
        name,
        kind: PropertyKind::Integer,
    }
}

const PERSONA_PROPS: &[PropertyDef] = &[text("nombreCompleto"), text("tipoLector")];
const LIBRO_PROPS: &[PropertyDef] = &[
    text("titulo"),
    text("generoLiterario"),
    integer("añoPublicacion"),
];
const AUTOR_PROPS: &[PropertyDef] = &[text("nombreCompleto"), text("nacionalidad")];
const CLUB_PROPS: &[PropertyDef] = &[text("nombre"), text("ubicacion"), text("tematica")];

/// Surrogate key written by bulk CSV loads. Indexed, not unique.
pub const CSV_ID: &str = "csvId";

// ── Labels ────────────────────────────────────────────────────────

/// Node label in the book-club graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Persona,
    Libro,
    Autor,
    Club,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Persona, Label::Libro, Label::Autor, Label::Club];

    /// Resolve a plural route segment (`personas`, `libros`, ...), ignoring case.
    pub fn from_plural(segment: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|label| label.plural().eq_ignore_ascii_case(segment))
            .ok_or_else(|| ModelError::UnknownEntity(segment.to_string()))
    }

    /// The Cypher label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persona => "Persona",
            Self::Libro => "Libro",
            Self::Autor => "Autor",
            Self::Club => "Club",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Persona => "personas",
            Self::Libro => "libros",
            Self::Autor => "autores",
            Self::Club => "clubes",
        }
    }

    /// Registered properties, identifier first.
    pub fn properties(&self) -> &'static [PropertyDef] {
        match self {
            Self::Persona => PERSONA_PROPS,
            Self::Libro => LIBRO_PROPS,
            Self::Autor => AUTOR_PROPS,
            Self::Club => CLUB_PROPS,
        }
    }

    /// The natural unique identifier property.
    pub fn identifier(&self) -> &'static PropertyDef {
        &self.properties()[0]
    }

    pub fn property(&self, name: &str) -> Option<&'static PropertyDef> {
        self.properties().iter().find(|p| p.name == name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Relationships ─────────────────────────────────────────────────

/// Directed relationship kinds, addressed by their route name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Autor -[:ESCRIBIO]-> Libro
    Autoria,
    /// Persona -[:LEE]-> Libro
    Lectura,
    /// Persona -[:PERTENECE_A]-> Club
    Membresia,
    /// Club -[:RECOMIENDA]-> Libro
    Recomendacion,
}

impl RelationKind {
    pub const ALL: [RelationKind; 4] = [
        RelationKind::Autoria,
        RelationKind::Lectura,
        RelationKind::Membresia,
        RelationKind::Recomendacion,
    ];

    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ModelError::UnknownRelation(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Autoria => "autoria",
            Self::Lectura => "lectura",
            Self::Membresia => "membresia",
            Self::Recomendacion => "recomendacion",
        }
    }

    /// The Cypher relationship type.
    pub fn rel_type(&self) -> &'static str {
        match self {
            Self::Autoria => "ESCRIBIO",
            Self::Lectura => "LEE",
            Self::Membresia => "PERTENECE_A",
            Self::Recomendacion => "RECOMIENDA",
        }
    }

    pub fn source(&self) -> Label {
        match self {
            Self::Autoria => Label::Autor,
            Self::Lectura | Self::Membresia => Label::Persona,
            Self::Recomendacion => Label::Club,
        }
    }

    pub fn target(&self) -> Label {
        match self {
            Self::Autoria | Self::Lectura | Self::Recomendacion => Label::Libro,
            Self::Membresia => Label::Club,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
