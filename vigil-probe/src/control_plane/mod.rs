//! Control-plane health probe.
//!
//! The probe is healthy only when the API server's aggregate health endpoint
//! answers with exactly `ok`. Anything else (error status, other body,
//! missing configuration) is `Down`.

mod client;
mod config;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument};
use vigil_core::ProbeOutcome;

use crate::error::ProbeError;

pub use client::KubeClient;
pub use config::{ClusterAuth, ClusterConfig, ConfigSource, SERVICE_ACCOUNT_DIR, default_kubeconfig_path};

/// Body the control plane returns when healthy.
const HEALTHY_BODY: &[u8] = b"ok";

// ============================================================================
// Client Trait
// ============================================================================

/// Source of the raw control-plane health response.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Fetches the raw body of the health endpoint.
    ///
    /// # Errors
    ///
    /// Configuration, transport and non-success status failures.
    async fn health(&self, timeout: Duration) -> Result<Vec<u8>, ProbeError>;
}

// ============================================================================
// Probe
// ============================================================================

/// Probe that asks the control plane whether it is healthy.
#[derive(Clone)]
pub struct ControlPlaneProbe {
    client: Arc<dyn ControlPlaneClient>,
}

impl std::fmt::Debug for ControlPlaneProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneProbe").finish_non_exhaustive()
    }
}

impl Default for ControlPlaneProbe {
    fn default() -> Self {
        Self::new(Arc::new(KubeClient::new()))
    }
}

impl ControlPlaneProbe {
    /// Creates a probe over the given client.
    pub fn new(client: Arc<dyn ControlPlaneClient>) -> Self {
        Self { client }
    }

    /// Queries the control plane within `deadline`.
    ///
    /// # Errors
    ///
    /// Whatever the client reports, [`ProbeError::Timeout`] past the
    /// deadline, or [`ProbeError::ControlPlaneUnhealthy`] for a body other
    /// than `ok`.
    #[instrument(skip(self))]
    pub async fn check(&self, deadline: Duration) -> Result<(), ProbeError> {
        let body = timeout(deadline, self.client.health(deadline))
            .await
            .map_err(|_| ProbeError::Timeout(deadline))??;

        if body == HEALTHY_BODY {
            Ok(())
        } else {
            let text = String::from_utf8_lossy(&body).into_owned();
            debug!(body = %text, "Control plane not healthy");
            Err(ProbeError::ControlPlaneUnhealthy(text))
        }
    }

    /// Runs one attempt and folds the result into an outcome.
    pub async fn probe(&self, deadline: Duration) -> ProbeOutcome {
        match self.check(deadline).await {
            Ok(()) => ProbeOutcome::up("control plane is healthy"),
            Err(e) => ProbeOutcome::down(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::CheckStatus;

    enum Reply {
        Body(&'static [u8]),
        Fail,
        Hang,
    }

    struct FakeClient(Reply);

    #[async_trait]
    impl ControlPlaneClient for FakeClient {
        async fn health(&self, _timeout: Duration) -> Result<Vec<u8>, ProbeError> {
            match self.0 {
                Reply::Body(body) => Ok(body.to_vec()),
                Reply::Fail => Err(ProbeError::ControlPlaneConfig("no kubeconfig".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(b"ok".to_vec())
                }
            }
        }
    }

    fn probe(reply: Reply) -> ControlPlaneProbe {
        ControlPlaneProbe::new(Arc::new(FakeClient(reply)))
    }

    #[tokio::test]
    async fn test_ok_body_is_up() {
        let outcome = probe(Reply::Body(b"ok")).probe(Duration::from_secs(1)).await;
        assert_eq!(outcome.status, CheckStatus::Up);
        assert_eq!(outcome.message, "control plane is healthy");
    }

    #[tokio::test]
    async fn test_other_body_is_down() {
        let outcome = probe(Reply::Body(b"[-]etcd failed"))
            .probe(Duration::from_secs(1))
            .await;
        assert_eq!(outcome.status, CheckStatus::Down);
        assert_eq!(
            outcome.message,
            "control plane returned unexpected status: [-]etcd failed"
        );
    }

    #[tokio::test]
    async fn test_ok_match_is_exact() {
        let outcome = probe(Reply::Body(b"ok\n")).probe(Duration::from_secs(1)).await;
        assert_eq!(outcome.status, CheckStatus::Down);
    }

    #[tokio::test]
    async fn test_client_failure_is_down() {
        let outcome = probe(Reply::Fail).probe(Duration::from_secs(1)).await;
        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.starts_with("failed to create control plane client"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_client_times_out() {
        let outcome = probe(Reply::Hang).probe(Duration::from_secs(2)).await;
        assert_eq!(outcome.status, CheckStatus::Down);
        assert_eq!(outcome.message, "timed out after 2s");
    }
}
