//! HTTP client wrapper shared by the HTTP probe.
//!
//! One `reqwest::Client` (and its connection pool) is reused for every HTTP
//! check; the deadline is applied per request so each check keeps its own
//! timeout.

use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ProbeError;

/// User agent string for Vigil.
const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Upper bound for establishing a connection, independent of check timeouts.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and per-request deadlines.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self { inner: client })
    }

    /// Wraps an existing reqwest client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Performs a GET request that must complete within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidRequest`] for URLs that cannot be
    /// requested, [`ProbeError::Timeout`] when the deadline passes, and
    /// [`ProbeError::Request`] for every other transport failure.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response, ProbeError> {
        let parsed = parse_url(url)?;
        debug!("GET request");

        let response = self
            .inner
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_request(e, timeout))?;

        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

/// Parses a URL and rejects schemes reqwest cannot speak.
fn parse_url(url: &str) -> Result<Url, ProbeError> {
    let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidRequest(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ProbeError::InvalidRequest(format!(
            "unsupported protocol scheme \"{other}\""
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
