use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::{chat, health, models};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(info(
    title = "relay-server",
    description = "Chat relay between a UI and a hosted language model",
    version = "1.0.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(chat::ChatApi::openapi());
    root.merge(health::HealthApi::openapi());
    root.merge(models::ModelsApi::openapi());
    root
}

/// Serve the merged OpenAPI document.
pub fn router() -> Router<Arc<AppState>> {
    let docs = get_docs();
    Router::new().route(
        "/api-docs/openapi.json",
        get(move || {
            let docs = docs.clone();
            async move { Json(docs) }
        }),
    )
}
