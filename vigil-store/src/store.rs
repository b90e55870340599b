//! Latest-result store.
//!
//! Maps check name to its most recent [`CheckResult`]. Each check's loop is
//! the only writer for its name, so replacing the entry wholesale under the
//! write lock is enough for last-writer-wins per name.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::debug;
use vigil_core::CheckResult;

// ============================================================================
// Result Store
// ============================================================================

/// Concurrency-safe mapping from check name to latest result.
///
/// Cloning is cheap and every clone sees the same data. Readers always get
/// owned copies.
#[derive(Debug, Clone)]
pub struct ResultStore {
    inner: Arc<RwLock<HashMap<String, CheckResult>>>,
    notify: Arc<watch::Sender<u64>>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            notify: Arc::new(notify),
        }
    }

    /// Replaces the stored result for `result.name`.
    pub async fn upsert(&self, result: CheckResult) {
        let name = result.name.clone();
        let replaced = {
            let mut inner = self.inner.write().await;
            inner.insert(name.clone(), result).is_some()
        };
        self.notify.send_modify(|version| *version = version.wrapping_add(1));
        debug!(check = %name, replaced, "Result stored");
    }

    /// Returns a copy of every stored result, in no particular order.
    pub async fn snapshot_all(&self) -> Vec<CheckResult> {
        self.inner.read().await.values().cloned().collect()
    }

    /// Returns a copy of the result for `name`, if one has been recorded.
    pub async fn lookup(&self, name: &str) -> Option<CheckResult> {
        self.inner.read().await.get(name).cloned()
    }

    /// Number of checks with a recorded result.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true if nothing has been recorded yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Subscribes to store changes.
    ///
    /// The value is a version counter bumped on every upsert.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Current version counter.
    pub fn version(&self) -> u64 {
        *self.notify.borrow()
    }
}

// ============================================================================
// Tests
// ============================================================================
