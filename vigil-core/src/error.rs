//! Core error types for Vigil.

use thiserror::Error;

/// Core error type for Vigil operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A check specification is missing a required field or has an invalid value.
    #[error("Invalid check '{name}': {reason}")]
    InvalidSpec {
        /// Name of the offending check (may be empty).
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates an invalid-spec error.
    pub fn invalid_spec(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
