use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;

/// Implemented by service state to report whether its backing stores are reachable.
pub trait Readiness: Clone + Send + Sync + 'static {
    fn is_ready(&self) -> impl Future<Output = bool> + Send;
}

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`: 200 when the service state reports ready, 503 otherwise.
pub async fn readyz<S: Readiness>(State(state): State<S>) -> StatusCode {
    if state.is_ready().await {
        StatusCode::OK
    } else {
        tracing::warn!("readiness probe failed");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
