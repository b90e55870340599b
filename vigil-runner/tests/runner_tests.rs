//! Scheduler behaviour against local fixtures.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vigil_core::{CheckKind, CheckSpec, CheckStatus};
use vigil_probe::{ControlPlaneClient, ProbeError, Prober};
use vigil_runner::{LoopState, Runner, RunnerError};
use vigil_store::{QueryFacade, ResultStore};

// ============================================================================
// Fixtures
// ============================================================================

/// Accepts and immediately drops TCP connections.
async fn tcp_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { while listener.accept().await.is_ok() {} });
    addr.to_string()
}

/// Answers every request with `200 OK`.
async fn http_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            });
        }
    });
    format!("http://{addr}/health")
}

struct Hung;

#[async_trait]
impl ControlPlaneClient for Hung {
    async fn health(&self, _timeout: Duration) -> Result<Vec<u8>, ProbeError> {
        std::future::pending().await
    }
}

/// Answers healthy after a fixed delay.
struct Slow(Duration);

#[async_trait]
impl ControlPlaneClient for Slow {
    async fn health(&self, _timeout: Duration) -> Result<Vec<u8>, ProbeError> {
        tokio::time::sleep(self.0).await;
        Ok(b"ok".to_vec())
    }
}

fn prober() -> Arc<Prober> {
    Arc::new(Prober::new().unwrap())
}

/// Waits until the store holds `count` results.
async fn wait_for_results(store: &ResultStore, count: usize) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.len().await < count {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("results did not arrive in time");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_result_available_after_first_tick() {
    let target = tcp_server().await;
    let store = ResultStore::new();
    let spec = CheckSpec::new("db", CheckKind::Tcp, target).with_interval(Duration::from_secs(60));

    let runner = Runner::start(vec![spec], prober(), store.clone()).unwrap();
    wait_for_results(&store, 1).await;

    let result = store.lookup("db").await.unwrap();
    assert_eq!(result.status, CheckStatus::Up);
    assert_eq!(runner.loop_state("db"), Some(LoopState::Running));

    runner.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_distinct_names_are_independent() {
    let target = tcp_server().await;
    let store = ResultStore::new();
    let specs: Vec<_> = (0..8)
        .map(|i| CheckSpec::new(format!("svc-{i}"), CheckKind::Tcp, target.clone()))
        .collect();

    let runner = Runner::start(specs, prober(), store.clone()).unwrap();
    wait_for_results(&store, 8).await;

    for i in 0..8 {
        let name = format!("svc-{i}");
        let result = store.lookup(&name).await.unwrap();
        assert_eq!(result.name, name);
        assert_eq!(result.target, target);
    }

    assert!(runner.shutdown(Duration::from_secs(1)).await.is_clean());
}

#[tokio::test]
async fn test_no_writes_after_shutdown() {
    let target = tcp_server().await;
    let store = ResultStore::new();
    let spec = CheckSpec::new("fast", CheckKind::Tcp, target)
        .with_interval(Duration::from_millis(50))
        .with_timeout(Duration::from_millis(500));

    let runner = Runner::start(vec![spec], prober(), store.clone()).unwrap();
    wait_for_results(&store, 1).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let report = runner.shutdown(Duration::from_secs(1)).await;
    assert_eq!(report.stopped, 1);
    assert_eq!(report.aborted, 0);

    let version = store.version();
    let before = store.snapshot_all().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(store.version(), version);
    assert_eq!(store.snapshot_all().await, before);
}

#[tokio::test]
async fn test_http_check_end_to_end() {
    let target = http_server().await;
    let store = ResultStore::new();
    let facade = QueryFacade::new(store.clone());
    let spec = CheckSpec::new("api", CheckKind::Http, target)
        .with_interval(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(1));

    let runner = Runner::start(vec![spec], prober(), store).unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let results = facade.list_results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "api");
    assert_eq!(results[0].status, CheckStatus::Up);
    assert!(results[0].duration < Duration::from_secs(1));

    runner.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_unknown_kind_recorded_as_unknown() {
    let store = ResultStore::new();
    let spec = CheckSpec::new("ping", CheckKind::parse("icmp"), "10.0.0.1");

    let runner = Runner::start(vec![spec], prober(), store.clone()).unwrap();
    wait_for_results(&store, 1).await;

    let result = store.lookup("ping").await.unwrap();
    assert_eq!(result.status, CheckStatus::Unknown);
    assert_eq!(result.message, "unsupported check type: icmp");

    runner.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_hung_probe_does_not_block_other_loops() {
    let target = tcp_server().await;
    let store = ResultStore::new();
    let prober = Arc::new(Prober::new().unwrap().with_control_plane(Arc::new(Hung)));
    let specs = vec![
        CheckSpec::new("cluster", CheckKind::ControlPlane, "").with_timeout(Duration::from_secs(30)),
        CheckSpec::new("db", CheckKind::Tcp, target),
    ];

    let runner = Runner::start(specs, prober, store.clone()).unwrap();
    wait_for_results(&store, 1).await;

    assert!(store.lookup("db").await.is_some());
    assert!(store.lookup("cluster").await.is_none());

    let report = runner.shutdown(Duration::from_millis(200)).await;
    assert_eq!(report.stopped, 1);
    assert_eq!(report.aborted, 1);
    assert!(store.lookup("cluster").await.is_none());
}

#[tokio::test]
async fn test_loop_state_cancelled_after_shutdown() {
    let target = tcp_server().await;
    let store = ResultStore::new();
    let spec = CheckSpec::new("db", CheckKind::Tcp, target);

    let runner = Runner::start(vec![spec], prober(), store.clone()).unwrap();
    wait_for_results(&store, 1).await;
    assert_eq!(runner.loop_state("db"), Some(LoopState::Running));

    let report = runner.shutdown(Duration::from_secs(1)).await;

    assert!(report.is_clean());
    assert_eq!(report.state("db"), Some(LoopState::Cancelled));
    assert!(report.all_terminal());
    assert_eq!(report.state("missing"), None);
}

#[tokio::test]
async fn test_aborted_loop_never_reaches_cancelled() {
    let store = ResultStore::new();
    let prober = Arc::new(Prober::new().unwrap().with_control_plane(Arc::new(Hung)));
    let spec = CheckSpec::new("cluster", CheckKind::ControlPlane, "").with_timeout(Duration::from_secs(30));

    let runner = Runner::start(vec![spec], prober, store.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let report = runner.shutdown(Duration::from_millis(100)).await;

    assert_eq!(report.aborted, 1);
    assert_eq!(report.state("cluster"), Some(LoopState::Running));
    assert!(!report.all_terminal());
}

#[tokio::test]
async fn test_in_flight_attempt_finishes_during_grace() {
    let store = ResultStore::new();
    let prober = Arc::new(
        Prober::new()
            .unwrap()
            .with_control_plane(Arc::new(Slow(Duration::from_millis(300)))),
    );
    let spec = CheckSpec::new("cluster", CheckKind::ControlPlane, "").with_timeout(Duration::from_secs(5));

    let runner = Runner::start(vec![spec], prober, store.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.lookup("cluster").await.is_none());

    let report = runner.shutdown(Duration::from_secs(2)).await;

    assert_eq!(report.stopped, 1);
    assert_eq!(report.aborted, 0);
    assert_eq!(report.state("cluster"), Some(LoopState::Cancelled));
    let result = store.lookup("cluster").await.expect("in-flight result recorded");
    assert_eq!(result.status, CheckStatus::Up);
}

#[tokio::test]
async fn test_duplicate_names_rejected() {
    let specs = vec![
        CheckSpec::new("db", CheckKind::Tcp, "localhost:1"),
        CheckSpec::new("db", CheckKind::Tcp, "localhost:2"),
    ];

    let err = Runner::start(specs, prober(), ResultStore::new()).unwrap_err();
    assert!(matches!(err, RunnerError::DuplicateCheck(name) if name == "db"));
}

#[tokio::test]
async fn test_empty_runner() {
    let store = ResultStore::new();
    let runner = Runner::start(Vec::new(), prober(), store.clone()).unwrap();

    assert!(runner.is_empty());
    assert!(QueryFacade::new(store).list_results().await.is_empty());
    assert_eq!(runner.shutdown(Duration::from_secs(1)).await.stopped, 0);
}

#[tokio::test]
async fn test_execute_all_keeps_spec_order() {
    let target = tcp_server().await;
    let specs = vec![
        CheckSpec::new("b", CheckKind::Tcp, target.clone()),
        CheckSpec::new("a", CheckKind::parse("icmp"), "x"),
    ];

    let results = Runner::execute_all(&specs, &Prober::new().unwrap()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "b");
    assert_eq!(results[0].status, CheckStatus::Up);
    assert_eq!(results[1].status, CheckStatus::Unknown);
}
