//! HTTP query server.
//!
//! Read-only JSON endpoints over the [`QueryFacade`]:
//!
//! - `GET /health` - liveness of the monitor itself
//! - `GET /results` - every latest result
//! - `GET /result/{name}` - one result, 404 when unknown

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use vigil_core::CheckResult;
use vigil_store::{QueryFacade, ServiceHealth};

/// Builds the query router.
pub fn router(facade: QueryFacade) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/results", get(list_results))
        .route("/result", get(missing_name))
        .route("/result/", get(missing_name))
        .route("/result/:name", get(get_result))
        .layer(TraceLayer::new_for_http())
        .with_state(facade)
}

/// Serves until `shutdown` completes, then drains in-flight requests.
pub async fn serve<F>(listener: TcpListener, facade: QueryFacade, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(facade))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Completes on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(facade): State<QueryFacade>) -> Json<ServiceHealth> {
    Json(facade.health())
}

async fn list_results(State(facade): State<QueryFacade>) -> Json<Vec<CheckResult>> {
    Json(facade.list_results().await)
}

async fn get_result(State(facade): State<QueryFacade>, Path(name): Path<String>) -> Response {
    match facade.get_result(&name).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            debug!(error = %e, "Result lookup failed");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "check not found", "name": name })),
            )
                .into_response()
        }
    }
}

async fn missing_name() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "check name required" })),
    )
}

// ============================================================================
// Tests
// ============================================================================
