//! Health monitoring handlers.

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::service::ServiceState;

/// Liveness probe response.
#[must_use]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
}

/// Reports process liveness; no auth, no external calls.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health))
}
