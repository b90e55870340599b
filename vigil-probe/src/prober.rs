//! Strategy dispatch.

use std::sync::Arc;
use tracing::{debug, instrument};
use vigil_core::{CheckKind, CheckSpec, ProbeOutcome};

use crate::client::HttpClient;
use crate::control_plane::{ControlPlaneClient, ControlPlaneProbe};
use crate::error::ProbeError;
use crate::http::HttpProbe;
use crate::tcp::TcpProbe;

/// Runs the probe strategy matching a spec's kind.
///
/// Shared by every check loop; it holds no per-check state.
#[derive(Debug, Clone)]
pub struct Prober {
    http: HttpProbe,
    tcp: TcpProbe,
    control_plane: ControlPlaneProbe,
}

impl Prober {
    /// Creates a prober with the default HTTP client and control-plane resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProbeError> {
        Ok(Self {
            http: HttpProbe::new(HttpClient::new()?),
            tcp: TcpProbe::new(),
            control_plane: ControlPlaneProbe::default(),
        })
    }

    /// Replaces the control-plane client.
    #[must_use]
    pub fn with_control_plane(mut self, client: Arc<dyn ControlPlaneClient>) -> Self {
        self.control_plane = ControlPlaneProbe::new(client);
        self
    }

    /// Replaces the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, client: HttpClient) -> Self {
        self.http = HttpProbe::new(client);
        self
    }

    /// Performs one attempt for `spec`.
    ///
    /// Never fails: errors become `Down`, unsupported kinds `Unknown`.
    #[instrument(skip(self, spec), fields(check = %spec.name, kind = %spec.kind))]
    pub async fn probe(&self, spec: &CheckSpec) -> ProbeOutcome {
        let timeout = spec.effective_timeout();

        let outcome = match &spec.kind {
            CheckKind::Http => {
                self.http
                    .probe(&spec.target, spec.expected_status(), timeout)
                    .await
            }
            CheckKind::Tcp => self.tcp.probe(&spec.target, timeout).await,
            CheckKind::ControlPlane => self.control_plane.probe(timeout).await,
            CheckKind::Other(_) => ProbeOutcome::unsupported(&spec.kind),
        };

        debug!(status = %outcome.status, message = %outcome.message, "Probe finished");
        outcome
    }
}
