use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for core/domain/storage layers.
#[derive(Error, Debug)]
pub enum AgencyError {
    #[error("Workspace not loaded")]
    WorkspaceNotLoaded,
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, AgencyError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] AgencyError),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::io::Error> for AgencyError {
    fn from(err: std::io::Error) -> Self {
        AgencyError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AgencyError {
    fn from(err: serde_json::Error) -> Self {
        AgencyError::StorageError(err.to_string())
    }
}
