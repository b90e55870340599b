//! Check loops and their lifecycle.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vigil_core::{CheckResult, CheckSpec};
use vigil_probe::Prober;
use vigil_store::ResultStore;

use crate::attempt::execute_attempt;
use crate::error::RunnerError;
use crate::state::LoopState;

// ============================================================================
// Shutdown Report
// ============================================================================

/// How the loops ended on shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    /// Loops that observed cancellation within the grace period.
    pub stopped: usize,
    /// Loops still busy after the grace period, aborted.
    pub aborted: usize,
    /// Last state each loop published, in start order. An aborted loop
    /// never reaches `Cancelled`.
    pub states: Vec<(String, LoopState)>,
}

impl ShutdownReport {
    /// Returns true if every loop stopped on its own.
    pub fn is_clean(&self) -> bool {
        self.aborted == 0
    }

    /// Final state of the loop for `name`.
    pub fn state(&self, name: &str) -> Option<LoopState> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, state)| *state)
    }

    /// Returns true if every loop reached its terminal state.
    pub fn all_terminal(&self) -> bool {
        self.states.iter().all(|(_, state)| state.is_terminal())
    }
}

// ============================================================================
// Runner
// ============================================================================

struct CheckLoop {
    name: String,
    state: watch::Receiver<LoopState>,
    handle: JoinHandle<()>,
}

/// Owns one periodic loop per check.
///
/// Dropping a runner cancels its loops without waiting for them.
pub struct Runner {
    store: ResultStore,
    token: CancellationToken,
    loops: Vec<CheckLoop>,
}

impl Runner {
    /// Spawns a loop for every spec.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`RunnerError::DuplicateCheck`] if two specs share a name; nothing is
    /// spawned in that case.
    pub fn start(
        specs: Vec<CheckSpec>,
        prober: Arc<Prober>,
        store: ResultStore,
    ) -> Result<Self, RunnerError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(RunnerError::DuplicateCheck(spec.name.clone()));
            }
        }

        let token = CancellationToken::new();
        let loops = specs
            .into_iter()
            .map(|spec| {
                let (state_tx, state_rx) = watch::channel(LoopState::Idle);
                let name = spec.name.clone();
                let handle = tokio::spawn(run_loop(
                    spec.with_defaults(),
                    Arc::clone(&prober),
                    store.clone(),
                    token.child_token(),
                    state_tx,
                ));
                CheckLoop {
                    name,
                    state: state_rx,
                    handle,
                }
            })
            .collect::<Vec<_>>();

        info!(checks = loops.len(), "Runner started");
        Ok(Self {
            store,
            token,
            loops,
        })
    }

    /// Runs every spec once, concurrently, without touching any store.
    ///
    /// Results come back in spec order.
    pub async fn execute_all(specs: &[CheckSpec], prober: &Prober) -> Vec<CheckResult> {
        join_all(specs.iter().map(|spec| execute_attempt(spec, prober))).await
    }

    /// The store the loops write to.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Number of loops.
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Returns true if no checks are scheduled.
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Current state of the loop for `name`.
    pub fn loop_state(&self, name: &str) -> Option<LoopState> {
        self.loops
            .iter()
            .find(|l| l.name == name)
            .map(|l| *l.state.borrow())
    }

    /// Current state of every loop, in start order.
    pub fn loop_states(&self) -> Vec<(String, LoopState)> {
        self.loops
            .iter()
            .map(|l| (l.name.clone(), *l.state.borrow()))
            .collect()
    }

    /// Cancels every loop and waits up to `grace` for them to exit.
    ///
    /// An attempt already in flight is allowed to finish and its result is
    /// recorded. Loops still running after `grace` are aborted. Once this
    /// returns, no loop writes to the store again.
    pub async fn shutdown(mut self, grace: Duration) -> ShutdownReport {
        info!(checks = self.loops.len(), ?grace, "Stopping check loops");
        self.token.cancel();

        let mut loops = std::mem::take(&mut self.loops);
        let drained = tokio::time::timeout(
            grace,
            join_all(loops.iter_mut().map(|l| &mut l.handle)),
        )
        .await;

        let mut report = ShutdownReport::default();
        match drained {
            Ok(joined) => {
                for (check, joined) in loops.iter().zip(joined) {
                    log_join_error(&check.name, joined);
                }
                report.stopped = loops.len();
            }
            Err(_) => {
                for check in &mut loops {
                    if check.handle.is_finished() {
                        log_join_error(&check.name, (&mut check.handle).await);
                        report.stopped += 1;
                        continue;
                    }
                    warn!(check = %check.name, "Check loop did not stop within grace period, aborting");
                    check.handle.abort();
                    // Wait for the abort to land so nothing writes afterwards.
                    log_join_error(&check.name, (&mut check.handle).await);
                    report.aborted += 1;
                }
            }
        }

        report.states = loops
            .iter()
            .map(|l| (l.name.clone(), *l.state.borrow()))
            .collect();

        info!(stopped = report.stopped, aborted = report.aborted, "Check loops stopped");
        report
    }
}

/// Logs a loop that panicked. Returns true if it did; an abort is expected
/// and is not reported.
fn log_join_error(name: &str, joined: Result<(), JoinError>) -> bool {
    match joined {
        Err(e) if !e.is_cancelled() => {
            warn!(check = %name, error = %e, "Check loop ended abnormally");
            true
        }
        _ => false,
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("checks", &self.loops.len())
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Loop
// ============================================================================

async fn run_loop(
    spec: CheckSpec,
    prober: Arc<Prober>,
    store: ResultStore,
    token: CancellationToken,
    state: watch::Sender<LoopState>,
) {
    state.send_replace(LoopState::Running);
    info!(check = %spec.name, kind = %spec.kind, interval = ?spec.interval, "Check loop started");

    // The first tick completes immediately.
    let mut ticker = interval(spec.effective_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                let result = execute_attempt(&spec, &prober).await;
                store.upsert(result).await;
            }
        }
    }

    state.send_replace(LoopState::Cancelled);
    debug!(check = %spec.name, "Check loop stopped");
}
