//! Provider model discovery.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use relay_types::{ModelInfo, ModelsResponse};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_models), components(schemas(ModelInfo, ModelsResponse)))]
pub struct ModelsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models", get(list_models))
}

/// List every model the provider exposes (`GET /models`).
#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    responses(
        (status = 200, description = "Provider models", body = ModelsResponse),
        (status = 500, description = "Provider query failed"),
        (status = 503, description = "No provider credential configured"),
    )
)]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelsResponse>, ServerError> {
    let models = state.relay.list_models().await?;
    debug!(count = models.len(), "listing provider models");
    Ok(Json(ModelsResponse::new(models)))
}
