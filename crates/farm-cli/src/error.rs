//! CLI error types.

use farm_entity::EntityError;
use farm_log::LogError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A log service failed.
    #[error(transparent)]
    Log(#[from] LogError),

    /// The entity store failed.
    #[error("storage error: {0}")]
    Storage(#[from] EntityError),

    /// An asset or log does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
