//! TCP connect probe.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument};
use vigil_core::ProbeOutcome;

use crate::error::ProbeError;

/// Probe that opens a TCP connection to `host:port`.
///
/// The connection is dropped as soon as it is established; no data is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl TcpProbe {
    /// Creates a TCP probe.
    pub fn new() -> Self {
        Self
    }

    /// Connects to `target` within `deadline`.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Connect`] for dial failures (including unresolvable
    /// hosts and malformed addresses), [`ProbeError::Timeout`] when the
    /// deadline passes first.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn check(&self, target: &str, deadline: Duration) -> Result<(), ProbeError> {
        match timeout(deadline, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => {
                debug!("TCP connect succeeded");
                Ok(())
            }
            Ok(Err(e)) => {
                debug!(error = %e, "TCP connect failed");
                Err(ProbeError::Connect(e))
            }
            Err(_) => {
                debug!(?deadline, "TCP connect timed out");
                Err(ProbeError::Timeout(deadline))
            }
        }
    }

    /// Runs one attempt and folds the result into an outcome.
    pub async fn probe(&self, target: &str, deadline: Duration) -> ProbeOutcome {
        match self.check(target, deadline).await {
            Ok(()) => ProbeOutcome::up("connection successful"),
            Err(e) => ProbeOutcome::down(e.to_string()),
        }
    }
}
