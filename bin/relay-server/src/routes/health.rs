//! Health / liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use relay_types::{HealthStatus, ServiceStatus};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthStatus, ServiceStatus)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness probe.
///
/// Always `healthy` while the process answers; the provider is not contacted.
/// `available_models` lists the identifiers whose handle is ready.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is reachable", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.relay.health())
}
