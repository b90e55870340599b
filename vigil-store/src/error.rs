//! Store error types.

use std::path::PathBuf;
use thiserror::Error;
use vigil_core::CoreError;

/// Errors that can occur in the store and configuration layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A process-level setting is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A check entry is invalid.
    #[error(transparent)]
    InvalidCheck(#[from] CoreError),

    /// Two checks share a name.
    #[error("duplicate check name: {0}")]
    DuplicateCheck(String),

    /// No result is stored under this name.
    #[error("check not found: {0}")]
    CheckNotFound(String),
}

impl StoreError {
    /// Returns true for errors raised while loading configuration.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, StoreError::CheckNotFound(_))
    }
}
