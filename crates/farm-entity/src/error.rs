//! Error types for entity storage.

use thiserror::Error;

use crate::types::EntityKind;

/// Errors that can occur while building, storing or querying entities.
///
/// Every backend failure surfaces through this type; callers treat it as the
/// storage failure kind and never retry automatically.
#[derive(Debug, Error)]
pub enum EntityError {
    /// A required field was not provided.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A query referenced a field the entity type does not have.
    #[error("unknown field '{field}' on {kind} entities")]
    UnknownField {
        /// Entity type the query targeted.
        kind: EntityKind,
        /// The offending field name.
        field: String,
    },

    /// An entity with the given ID was not found.
    #[error("{kind} entity not found: {id}")]
    NotFound {
        /// Entity type that was looked up.
        kind: EntityKind,
        /// The missing identifier.
        id: u64,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for entity operations.
pub type Result<T> = std::result::Result<T, EntityError>;
