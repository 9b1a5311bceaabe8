//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::relay::RelayService;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Model resolution, handle registry and provider access.
    pub relay: Arc<RelayService>,
}

impl AppState {
    pub fn new(config: Config, relay: RelayService) -> Self {
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
        }
    }
}
