//! Result types.
//!
//! - [`CheckStatus`] - Up / Down / Unknown
//! - [`ProbeOutcome`] - What a probe strategy returns
//! - [`CheckResult`] - What the store keeps per check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::check::{CheckKind, CheckSpec};
use super::duration::millis;

// ============================================================================
// Check Status
// ============================================================================

/// Outcome of a probe attempt.
///
/// Every failure (DNS, refused connection, TLS, timeout, unexpected status or
/// content) is `Down`. `Unknown` only means the check kind has no strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    /// Target is healthy.
    Up,
    /// Target is unreachable or unhealthy.
    Down,
    /// The check could not be evaluated.
    Unknown,
}

impl CheckStatus {
    /// Returns the wire label (`UP`, `DOWN`, `UNKNOWN`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns a glyph for terminal output.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Up => "✓",
            Self::Down => "✗",
            Self::Unknown => "?",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Probe Outcome
// ============================================================================

/// Status plus diagnostic message from one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Observed status.
    pub status: CheckStatus,
    /// Human-readable diagnostic.
    pub message: String,
}

impl ProbeOutcome {
    /// A healthy outcome.
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Up,
            message: message.into(),
        }
    }

    /// A failed outcome.
    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Down,
            message: message.into(),
        }
    }

    /// The outcome for a kind with no probe strategy.
    pub fn unsupported(kind: &CheckKind) -> Self {
        Self {
            status: CheckStatus::Unknown,
            message: format!("unsupported check type: {kind}"),
        }
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// The latest observed outcome for a check.
///
/// `kind` and `target` are copied from the spec so a result is
/// self-contained when reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Check name.
    pub name: String,
    /// Check kind.
    #[serde(rename = "type")]
    pub kind: CheckKind,
    /// Probed address or URL.
    pub target: String,
    /// Observed status.
    pub status: CheckStatus,
    /// Diagnostic message.
    pub message: String,
    /// When the attempt started.
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
    /// Wall time the attempt took.
    #[serde(rename = "durationMs", with = "millis")]
    pub duration: Duration,
}

impl CheckResult {
    /// Builds a result for `spec` from a probe outcome.
    pub fn from_outcome(
        spec: &CheckSpec,
        outcome: ProbeOutcome,
        observed_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            target: spec.target.clone(),
            status: outcome.status,
            message: outcome.message,
            observed_at,
            duration,
        }
    }

    /// Returns true if the target was healthy.
    pub fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }
}

// ============================================================================
// Tests
// ============================================================================
