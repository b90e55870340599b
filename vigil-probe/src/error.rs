//! Probe error types.
//!
//! These never leave a probe: [`Prober`](crate::Prober) renders them into
//! the message of a `Down` outcome, so the `Display` text is what users see.

use std::time::Duration;
use thiserror::Error;

/// Error type for a single probe attempt.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be constructed (bad URL, unsupported scheme).
    #[error("failed to create request: {0}")]
    InvalidRequest(String),

    /// The request was sent but failed (DNS, connect, TLS, protocol).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The attempt exceeded its deadline.
    #[error("timed out after {}", human(.0))]
    Timeout(Duration),

    /// The response status did not match the expected one.
    #[error("unexpected status: got {got}, want {want}")]
    UnexpectedStatus {
        /// Status the server returned.
        got: u16,
        /// Status the check expects.
        want: u16,
    },

    /// TCP connect failed.
    #[error("failed to connect: {0}")]
    Connect(#[source] std::io::Error),

    /// No usable control-plane configuration could be resolved.
    #[error("failed to create control plane client: {0}")]
    ControlPlaneConfig(String),

    /// The control-plane health query failed in transport or returned an error status.
    #[error("control plane health check failed: {0}")]
    ControlPlane(String),

    /// The control plane answered, but not with `ok`.
    #[error("control plane returned unexpected status: {0}")]
    ControlPlaneUnhealthy(String),
}

fn human(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

impl ProbeError {
    /// Maps a reqwest error, turning its timeout flavour into [`ProbeError::Timeout`].
    pub fn from_request(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::Request(error)
        }
    }
}
