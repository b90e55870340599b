//! Control-plane connection resolution.
//!
//! Mirrors the usual client behaviour: try the in-cluster service account
//! first, then fall back to a kubeconfig file (`$KUBECONFIG`, else
//! `~/.kube/config`) and use its current context.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::ProbeError;

/// Where an in-cluster pod finds its service-account credentials.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

// ============================================================================
// Resolved Configuration
// ============================================================================

/// How requests to the control plane authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum ClusterAuth {
    /// No credentials.
    None,
    /// Bearer token.
    Bearer(String),
    /// HTTP basic auth.
    Basic {
        /// User name.
        username: String,
        /// Password, if any.
        password: Option<String>,
    },
    /// Client certificate and key, both PEM.
    ClientCertificate {
        /// Certificate chain (PEM).
        cert_pem: Vec<u8>,
        /// Private key (PEM).
        key_pem: Vec<u8>,
    },
}

impl fmt::Debug for ClusterAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}, <redacted>)"),
            Self::ClientCertificate { .. } => f.write_str("ClientCertificate(<redacted>)"),
        }
    }
}

/// A resolved API server endpoint with its TLS settings and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Base URL of the API server, e.g. `https://10.0.0.1:6443`.
    pub server: String,
    /// CA bundle (PEM) used to verify the server.
    pub ca_pem: Option<Vec<u8>>,
    /// Skip server certificate verification.
    pub insecure_skip_tls_verify: bool,
    /// Credentials.
    pub auth: ClusterAuth,
}

impl ClusterConfig {
    /// An unauthenticated config for `server`.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ca_pem: None,
            insecure_skip_tls_verify: false,
            auth: ClusterAuth::None,
        }
    }

    /// Sets the credentials.
    pub fn with_auth(mut self, auth: ClusterAuth) -> Self {
        self.auth = auth;
        self
    }

    /// URL of the aggregate health endpoint.
    pub fn healthz_url(&self) -> String {
        format!("{}/healthz", self.server.trim_end_matches('/'))
    }

    /// Builds the in-cluster config from the service environment.
    ///
    /// # Errors
    ///
    /// Fails when not running in a cluster or the service-account files are unreadable.
    pub async fn in_cluster() -> Result<Self, ProbeError> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").ok();
        let port = std::env::var("KUBERNETES_SERVICE_PORT").ok();
        Self::in_cluster_with(host, port, Path::new(SERVICE_ACCOUNT_DIR)).await
    }

    /// Builds the in-cluster config from explicit parts.
    ///
    /// # Errors
    ///
    /// Fails when host or port is missing, or the token cannot be read.
    pub async fn in_cluster_with(
        host: Option<String>,
        port: Option<String>,
        service_account_dir: &Path,
    ) -> Result<Self, ProbeError> {
        let (Some(host), Some(port)) = (host.filter(|h| !h.is_empty()), port.filter(|p| !p.is_empty()))
        else {
            return Err(ProbeError::ControlPlaneConfig(
                "unable to load in-cluster configuration, KUBERNETES_SERVICE_HOST and \
                 KUBERNETES_SERVICE_PORT must be defined"
                    .to_string(),
            ));
        };

        let token = read_file(&service_account_dir.join("token")).await?;
        let token = String::from_utf8_lossy(&token).trim().to_string();

        // The CA is optional; without it the system roots are used.
        let ca_pem = tokio::fs::read(service_account_dir.join("ca.crt")).await.ok();

        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host
        };

        Ok(Self {
            server: format!("https://{host}:{port}"),
            ca_pem,
            insecure_skip_tls_verify: false,
            auth: ClusterAuth::Bearer(token),
        })
    }

    /// Loads the current context of a kubeconfig file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or its current context
    /// does not name a cluster that exists in the file.
    #[instrument(fields(path = %path.display()))]
    pub async fn from_kubeconfig(path: &Path) -> Result<Self, ProbeError> {
        let raw = read_file(path).await?;
        let kubeconfig: Kubeconfig = serde_yaml::from_slice(&raw).map_err(|e| {
            ProbeError::ControlPlaneConfig(format!("invalid kubeconfig {}: {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        kubeconfig.resolve(base_dir).await
    }
}

/// Default kubeconfig location: first entry of `$KUBECONFIG`, else `~/.kube/config`.
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    if let Some(value) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

// ============================================================================
// Config Source
// ============================================================================

/// Where the control-plane connection comes from.
#[derive(Debug, Clone, Default)]
pub enum ConfigSource {
    /// In-cluster first, then the default kubeconfig.
    #[default]
    Auto,
    /// In-cluster service account only.
    InCluster,
    /// A specific kubeconfig file.
    Kubeconfig(PathBuf),
    /// A fixed, already-resolved config.
    Static(ClusterConfig),
}

impl ConfigSource {
    /// Resolves a [`ClusterConfig`].
    ///
    /// # Errors
    ///
    /// [`ProbeError::ControlPlaneConfig`] when no source yields a config.
    pub async fn resolve(&self) -> Result<ClusterConfig, ProbeError> {
        match self {
            Self::Auto => match ClusterConfig::in_cluster().await {
                Ok(config) => Ok(config),
                Err(e) => {
                    debug!(error = %e, "In-cluster config unavailable, trying kubeconfig");
                    let path = default_kubeconfig_path().ok_or_else(|| {
                        ProbeError::ControlPlaneConfig(
                            "cannot get user home directory".to_string(),
                        )
                    })?;
                    ClusterConfig::from_kubeconfig(&path).await
                }
            },
            Self::InCluster => ClusterConfig::in_cluster().await,
            Self::Kubeconfig(path) => ClusterConfig::from_kubeconfig(path).await,
            Self::Static(config) => Ok(config.clone()),
        }
    }
}

// ============================================================================
// Kubeconfig File Format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(default)]
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterEntry {
    server: String,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: ContextEntry,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: UserEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserEntry {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<PathBuf>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    client_certificate: Option<PathBuf>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_key: Option<PathBuf>,
    #[serde(default)]
    client_key_data: Option<String>,
    #[serde(default)]
    exec: Option<IgnoredAny>,
    #[serde(default)]
    auth_provider: Option<IgnoredAny>,
}

impl Kubeconfig {
    async fn resolve(self, base_dir: &Path) -> Result<ClusterConfig, ProbeError> {
        let context_name = self
            .current_context
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProbeError::ControlPlaneConfig("no current-context set".to_string()))?;

        let context = self
            .contexts
            .into_iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| {
                ProbeError::ControlPlaneConfig(format!("context \"{context_name}\" not found"))
            })?
            .context;

        let cluster = self
            .clusters
            .into_iter()
            .find(|c| c.name == context.cluster)
            .ok_or_else(|| {
                ProbeError::ControlPlaneConfig(format!("cluster \"{}\" not found", context.cluster))
            })?
            .cluster;

        let user = match &context.user {
            Some(name) => self
                .users
                .into_iter()
                .find(|u| &u.name == name)
                .map(|u| u.user)
                .unwrap_or_default(),
            None => UserEntry::default(),
        };

        let ca_pem = load_inline_or_file(
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base_dir,
        )
        .await?;

        let auth = user.into_auth(base_dir).await?;

        debug!(server = %cluster.server, context = %context_name, "Resolved kubeconfig context");

        Ok(ClusterConfig {
            server: cluster.server,
            ca_pem,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            auth,
        })
    }
}

impl UserEntry {
    async fn into_auth(self, base_dir: &Path) -> Result<ClusterAuth, ProbeError> {
        let cert = load_inline_or_file(
            self.client_certificate_data.as_deref(),
            self.client_certificate.as_deref(),
            base_dir,
        )
        .await?;
        let key = load_inline_or_file(
            self.client_key_data.as_deref(),
            self.client_key.as_deref(),
            base_dir,
        )
        .await?;

        if let (Some(cert_pem), Some(key_pem)) = (cert, key) {
            return Ok(ClusterAuth::ClientCertificate { cert_pem, key_pem });
        }

        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            return Ok(ClusterAuth::Bearer(token));
        }

        if let Some(path) = self.token_file {
            let raw = read_file(&base_dir.join(path)).await?;
            return Ok(ClusterAuth::Bearer(String::from_utf8_lossy(&raw).trim().to_string()));
        }

        // Plugin credentials need an external command or provider.
        if self.exec.is_some() {
            return Err(unsupported_auth("exec"));
        }
        if self.auth_provider.is_some() {
            return Err(unsupported_auth("auth-provider"));
        }

        if let Some(username) = self.username {
            return Ok(ClusterAuth::Basic {
                username,
                password: self.password,
            });
        }

        Ok(ClusterAuth::None)
    }
}

fn unsupported_auth(method: &str) -> ProbeError {
    ProbeError::ControlPlaneConfig(format!("unsupported kubeconfig auth: {method}"))
}

/// Inline base64 data wins over a file path; relative paths are resolved
/// against the kubeconfig's directory.
async fn load_inline_or_file(
    data: Option<&str>,
    path: Option<&Path>,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>, ProbeError> {
    if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
        let decoded = STANDARD
            .decode(data.trim())
            .map_err(|e| ProbeError::ControlPlaneConfig(format!("invalid base64 data: {e}")))?;
        return Ok(Some(decoded));
    }
    match path {
        Some(path) => read_file(&base_dir.join(path)).await.map(Some),
        None => Ok(None),
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ProbeError> {
    tokio::fs::read(path).await.map_err(|e| {
        ProbeError::ControlPlaneConfig(format!("failed to read {}: {e}", path.display()))
    })
}

// ============================================================================
// Tests
// ============================================================================
