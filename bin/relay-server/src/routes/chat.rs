//! Chat relay route.
//!
//! The caller sends the whole conversation every turn.  The last message is
//! forwarded as the new turn and everything before it as history; nothing is
//! kept between requests.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use relay_types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ChatResponse, ChatMessage, Role, Usage))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Relay one conversation turn (`POST /chat`).
///
/// Unknown or missing `model` values fall back to the default model.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 400, description = "No messages, blank content or malformed body"),
        (status = 500, description = "Provider error (text passed through)"),
        (status = 503, description = "Resolved model unavailable"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = payload?;
    req.validate()?;

    debug!(
        model = ?req.model,
        messages = req.messages.len(),
        "chat request"
    );

    let resp = state.relay.chat(&req).await?;
    Ok(Json(resp))
}
