//! Error types for raw schema ingestion.

use sgschema_core::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RawError {
    #[error("missing keys in raw schema: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("extra keys in raw schema: {}", .0.join(", "))]
    ExtraKeys(Vec<String>),

    /// The private schema page did not contain the expected payload.
    #[error("private schema page is malformed: {0}")]
    PrivatePage(String),

    /// The schema provider failed to produce a payload.
    #[error("schema provider error: {0}")]
    Provider(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for raw schema operations.
pub type RawResult<T> = Result<T, RawError>;
