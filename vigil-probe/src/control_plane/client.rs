//! Control-plane API client.

use async_trait::async_trait;
use reqwest::{Certificate, Client, Identity};
use std::time::Duration;
use tracing::{debug, instrument};

use super::ControlPlaneClient;
use super::config::{ClusterAuth, ClusterConfig, ConfigSource};
use crate::error::ProbeError;

const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Queries the API server's `/healthz` endpoint.
///
/// The connection is resolved on every attempt, so a missing or broken
/// cluster configuration only fails the attempts that hit it.
#[derive(Debug, Clone, Default)]
pub struct KubeClient {
    source: ConfigSource,
}

impl KubeClient {
    /// Resolves in-cluster first, then the default kubeconfig.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific configuration source.
    pub fn with_source(source: ConfigSource) -> Self {
        Self { source }
    }

    /// The configured source.
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// Builds a reqwest client for one resolved cluster.
fn build_client(config: &ClusterConfig, timeout: Duration) -> Result<Client, ProbeError> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout);

    if let Some(ca) = &config.ca_pem {
        let certs = Certificate::from_pem_bundle(ca)
            .map_err(|e| ProbeError::ControlPlaneConfig(format!("invalid CA bundle: {e}")))?;
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    if config.insecure_skip_tls_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let ClusterAuth::ClientCertificate { cert_pem, key_pem } = &config.auth {
        let mut pem = cert_pem.clone();
        pem.push(b'\n');
        pem.extend_from_slice(key_pem);
        let identity = Identity::from_pem(&pem)
            .map_err(|e| ProbeError::ControlPlaneConfig(format!("invalid client certificate: {e}")))?;
        builder = builder.identity(identity);
    }

    builder
        .build()
        .map_err(|e| ProbeError::ControlPlaneConfig(e.to_string()))
}

#[async_trait]
impl ControlPlaneClient for KubeClient {
    #[instrument(skip(self))]
    async fn health(&self, timeout: Duration) -> Result<Vec<u8>, ProbeError> {
        let config = self.source.resolve().await?;
        let client = build_client(&config, timeout)?;
        let url = config.healthz_url();
        debug!(url = %url, "Querying control plane health");

        let mut request = client.get(&url).timeout(timeout);
        request = match &config.auth {
            ClusterAuth::Bearer(token) => request.bearer_auth(token),
            ClusterAuth::Basic { username, password } => {
                request.basic_auth(username, password.as_ref())
            }
            ClusterAuth::None | ClusterAuth::ClientCertificate { .. } => request,
        };

        let response = request.send().await.map_err(|e| transport_error(e, timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        if !status.is_success() {
            return Err(ProbeError::ControlPlane(format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }

        Ok(body.to_vec())
    }
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> ProbeError {
    match ProbeError::from_request(error, timeout) {
        ProbeError::Timeout(d) => ProbeError::Timeout(d),
        other => ProbeError::ControlPlane(other.to_string()),
    }
}
