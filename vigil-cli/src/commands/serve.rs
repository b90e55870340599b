//! Serve command - run the monitor and the query server.

use anyhow::{Context, Result};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use vigil_probe::Prober;
use vigil_runner::Runner;
use vigil_store::{Config, QueryFacade, ResultStore};

use crate::server;
use crate::{Cli, ExitCode};

/// Runs until SIGINT/SIGTERM, then stops the server and drains the loops.
pub async fn run(_cli: &Cli, config: Config) -> Result<ExitCode> {
    let prober = Arc::new(Prober::new().context("failed to initialise probes")?);

    // Bind before starting loops so a port clash aborts cleanly.
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.api_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind query server on {addr}"))?;

    let store = ResultStore::new();
    let runner = Runner::start(config.checks, prober, store.clone())?;
    info!(%addr, checks = runner.len(), "Query server listening");

    if let Err(e) = server::serve(listener, QueryFacade::new(store), server::shutdown_signal()).await {
        error!(error = %e, "Query server failed");
    }

    info!("Shutting down");
    let report = runner.shutdown(config.shutdown_grace).await;
    if !report.is_clean() {
        warn!(aborted = report.aborted, "Some check loops were aborted");
    }
    for (name, state) in report.states.iter().filter(|(_, s)| !s.is_terminal()) {
        warn!(check = %name, %state, "Check loop did not reach a terminal state");
    }
    info!(stopped = report.stopped, aborted = report.aborted, "Shutdown complete");

    Ok(ExitCode::Success)
}
