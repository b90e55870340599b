//! HTTP GET probe.

use std::time::Duration;
use tracing::{debug, instrument};
use vigil_core::ProbeOutcome;

use crate::client::HttpClient;
use crate::error::ProbeError;

/// Probe that issues a GET and compares the response status.
///
/// DNS, connect, TLS and timeout failures are all reported as `Down`;
/// there is no separate "unreachable" state.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: HttpClient,
}

impl HttpProbe {
    /// Creates a probe using the given client.
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Performs the request and returns the status code when it matches.
    ///
    /// # Errors
    ///
    /// Any request failure, or [`ProbeError::UnexpectedStatus`] on a mismatch.
    #[instrument(skip(self), fields(url = %target))]
    pub async fn check(
        &self,
        target: &str,
        expected_status: u16,
        timeout: Duration,
    ) -> Result<u16, ProbeError> {
        let response = self.client.get(target, timeout).await?;
        let got = response.status().as_u16();

        if got != expected_status {
            debug!(got, want = expected_status, "Status mismatch");
            return Err(ProbeError::UnexpectedStatus {
                got,
                want: expected_status,
            });
        }

        Ok(got)
    }

    /// Runs one attempt and folds the result into an outcome.
    pub async fn probe(&self, target: &str, expected_status: u16, timeout: Duration) -> ProbeOutcome {
        match self.check(target, expected_status, timeout).await {
            Ok(code) => ProbeOutcome::up(format!("status code: {code}")),
            Err(e) => ProbeOutcome::down(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use vigil_core::CheckStatus;

    /// Serves every connection with a fixed status line.
    async fn serve_status(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    let response =
                        format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        format!("http://{addr}/health")
    }

    fn probe() -> HttpProbe {
        HttpProbe::new(HttpClient::new().unwrap())
    }

    #[tokio::test]
    async fn test_expected_status_is_up() {
        let url = serve_status("200 OK").await;
        let outcome = probe().probe(&url, 200, Duration::from_secs(2)).await;

        assert_eq!(outcome.status, CheckStatus::Up);
        assert!(outcome.message.contains("200"), "{}", outcome.message);
    }

    #[tokio::test]
    async fn test_status_mismatch_is_down_with_both_codes() {
        let url = serve_status("200 OK").await;
        let outcome = probe().probe(&url, 204, Duration::from_secs(2)).await;

        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.contains("200"), "{}", outcome.message);
        assert!(outcome.message.contains("204"), "{}", outcome.message);
    }

    #[tokio::test]
    async fn test_server_error_is_down() {
        let url = serve_status("503 Service Unavailable").await;
        let outcome = probe().probe(&url, 200, Duration::from_secs(2)).await;

        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.contains("503"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_down() {
        let outcome = probe().probe("::not-a-url::", 200, Duration::from_secs(1)).await;

        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.starts_with("failed to create request"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_down() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = probe()
            .probe(&format!("http://{addr}/"), 200, Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.starts_with("request failed"), "{}", outcome.message);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without answering.
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let outcome = probe()
            .probe(&format!("http://{addr}/"), 200, Duration::from_millis(200))
            .await;

        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.message.starts_with("timed out"), "{}", outcome.message);
    }
}
