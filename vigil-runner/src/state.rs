//! Per-loop lifecycle state.

use std::fmt;

/// Lifecycle of one check loop: `Idle -> Running -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopState {
    /// Spawned but not yet polled.
    #[default]
    Idle,
    /// Probing on its interval.
    Running,
    /// Observed cancellation and exited. Terminal.
    Cancelled,
}

impl LoopState {
    /// Returns true once the loop has exited.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Lowercase name for logs and output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
