//! Error types for schema loading and name resolution.

use thiserror::Error;

/// Errors raised by the schema model and the resolution engine.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A spec string does not match `[!#$]?[\w:-]+`.
    #[error("{spec:?} cannot be {kind}: {reason}")]
    Format {
        spec: String,
        kind: SpecKind,
        reason: String,
    },

    /// Field resolution against an entity type the schema does not know.
    #[error("{0:?} is not an entity type")]
    UnknownEntity(String),

    /// A bare spec could not be resolved in strict mode.
    #[error("{spec:?} is not {what}")]
    Resolution { spec: String, what: String },

    /// A "resolve exactly one" call got zero or several results.
    #[error("{spec:?} resolved to {count} values, expected exactly one: {candidates:?}")]
    Ambiguity {
        spec: String,
        count: usize,
        candidates: Vec<String>,
    },

    /// An override document has unknown keys or an inconsistent shape.
    #[error("invalid schema document: {0}")]
    OverrideDocument(String),

    /// A structure containing a cycle cannot become a JSON tree.
    #[error("structure contains a cycle and cannot be converted to JSON")]
    CyclicValue,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// What a malformed spec was supposed to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Entity,
    Field,
}

impl std::fmt::Display for SpecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecKind::Entity => f.write_str("an entity"),
            SpecKind::Field => f.write_str("a field"),
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
