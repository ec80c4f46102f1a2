//! Error types for log services.

use farm_entity::EntityError;
use thiserror::Error;

/// Errors that can occur in log queries, lookups and configuration.
#[derive(Debug, Error)]
pub enum LogError {
    /// The entity store failed. Never retried here.
    #[error("storage error: {0}")]
    Storage(#[from] EntityError),

    /// Query criteria contained an unknown key or a malformed value.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Log type configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
