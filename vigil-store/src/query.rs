//! Read-only query surface over the result store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::CheckResult;

use crate::error::StoreError;
use crate::store::ResultStore;

/// Liveness of the monitor process itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    /// Always `UP` while the process can answer.
    pub status: &'static str,
    /// When the answer was produced.
    pub timestamp: DateTime<Utc>,
}

/// The three read operations external consumers use.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    store: ResultStore,
}

impl QueryFacade {
    /// Wraps a store.
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }

    /// Liveness indicator for the monitor.
    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            status: "UP",
            timestamp: Utc::now(),
        }
    }

    /// Every current result, ordered by name.
    pub async fn list_results(&self) -> Vec<CheckResult> {
        let mut results = self.store.snapshot_all().await;
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results
    }

    /// One result by name.
    ///
    /// # Errors
    ///
    /// [`StoreError::CheckNotFound`] when nothing is recorded under `name`.
    pub async fn get_result(&self, name: &str) -> Result<CheckResult, StoreError> {
        self.store
            .lookup(name)
            .await
            .ok_or_else(|| StoreError::CheckNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vigil_core::{CheckKind, CheckSpec, ProbeOutcome};

    async fn facade_with(names: &[&str]) -> QueryFacade {
        let store = ResultStore::new();
        for name in names {
            let spec = CheckSpec::new(*name, CheckKind::Http, "http://localhost");
            store
                .upsert(CheckResult::from_outcome(
                    &spec,
                    ProbeOutcome::up("status code: 200"),
                    Utc::now(),
                    Duration::from_millis(5),
                ))
                .await;
        }
        QueryFacade::new(store)
    }

    #[tokio::test]
    async fn test_health_is_up() {
        let facade = facade_with(&[]).await;
        let health = facade.health();
        assert_eq!(health.status, "UP");

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "UP");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_list_results_empty_store() {
        let facade = facade_with(&[]).await;
        assert!(facade.list_results().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_results_sorted() {
        let facade = facade_with(&["web", "api", "db"]).await;
        let names: Vec<_> = facade
            .list_results()
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["api", "db", "web"]);
    }

    #[tokio::test]
    async fn test_get_result_not_found() {
        let facade = facade_with(&["api"]).await;

        assert_eq!(facade.get_result("api").await.unwrap().name, "api");
        assert!(matches!(
            facade.get_result("nonexistent").await,
            Err(StoreError::CheckNotFound(name)) if name == "nonexistent"
        ));
    }
}
