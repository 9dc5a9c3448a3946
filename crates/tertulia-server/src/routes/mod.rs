//! Route handlers.

pub mod admin;
pub mod consultas;
pub mod entities;
pub mod relations;
