//! Runner error types.

use thiserror::Error;

/// Errors raised when starting the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Two specs share a name; results are keyed by name.
    #[error("duplicate check name: {0}")]
    DuplicateCheck(String),
}
