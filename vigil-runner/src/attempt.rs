//! A single timed probe attempt.

use chrono::Utc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, warn};
use vigil_core::{CheckResult, CheckSpec, CheckStatus, ProbeOutcome};
use vigil_probe::{ProbeError, Prober};

/// Probes `spec` once under its timeout and builds the result.
///
/// `observed_at` is taken before dispatch. If the strategy overruns the
/// deadline it is abandoned and the attempt is recorded as `Down`.
pub async fn execute_attempt(spec: &CheckSpec, prober: &Prober) -> CheckResult {
    let deadline = spec.effective_timeout();
    let observed_at = Utc::now();
    let started = Instant::now();

    let outcome = match timeout(deadline, prober.probe(spec)).await {
        Ok(outcome) => outcome,
        Err(_) => ProbeOutcome::down(ProbeError::Timeout(deadline).to_string()),
    };
    let duration = started.elapsed();
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

    match outcome.status {
        CheckStatus::Up => info!(
            check = %spec.name,
            status = %outcome.status,
            message = %outcome.message,
            duration_ms,
            "Check completed"
        ),
        CheckStatus::Down | CheckStatus::Unknown => warn!(
            check = %spec.name,
            status = %outcome.status,
            message = %outcome.message,
            duration_ms,
            "Check completed"
        ),
    }

    CheckResult::from_outcome(spec, outcome, observed_at, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use vigil_core::CheckKind;
    use vigil_probe::ControlPlaneClient;

    struct Hung;

    #[async_trait]
    impl ControlPlaneClient for Hung {
        async fn health(&self, _timeout: Duration) -> Result<Vec<u8>, ProbeError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_unknown_kind_result() {
        let prober = Prober::new().unwrap();
        let spec = CheckSpec::new("ping", CheckKind::parse("icmp"), "10.0.0.1");

        let result = execute_attempt(&spec, &prober).await;

        assert_eq!(result.name, "ping");
        assert_eq!(result.status, CheckStatus::Unknown);
        assert_eq!(result.target, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_overrunning_probe_is_abandoned_at_deadline() {
        let prober = Prober::new().unwrap().with_control_plane(Arc::new(Hung));
        let spec = CheckSpec::new("cluster", CheckKind::ControlPlane, "")
            .with_timeout(Duration::from_millis(150));

        let before = Utc::now();
        let result = execute_attempt(&spec, &prober).await;

        assert_eq!(result.status, CheckStatus::Down);
        assert!(result.message.starts_with("timed out"), "{}", result.message);
        assert!(result.observed_at >= before);
        assert!(result.duration >= Duration::from_millis(150));
        assert!(result.duration < Duration::from_secs(1));
    }
}
