//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - `POST /chat`, `GET /health`, `GET /models`
//! - Optional OpenAPI document (disable with `RELAY_ENABLE_DOCS=false`)

mod chat;
pub mod doc;
mod health;
mod models;

use std::sync::Arc;

use axum::{middleware, Router};
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(models::router());

    if state.config.enable_docs {
        app = app.merge(doc::router());
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
