use thiserror::Error;

/// Validation errors raised while resolving caller input against the registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    #[error("Unknown relationship type: '{0}'")]
    UnknownRelation(String),

    #[error("Unknown property '{property}' for {label}")]
    UnknownProperty { label: String, property: String },

    #[error("Invalid value for {label}.{property}: expected {expected}")]
    InvalidValue {
        label: String,
        property: String,
        expected: &'static str,
    },
}
