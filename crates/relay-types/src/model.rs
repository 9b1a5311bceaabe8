//! Model discovery types (`GET /models`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A model exposed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    /// Provider resource name, e.g. `"models/gemini-1.5-flash"`.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response body for `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelsResponse {
    pub available_models: Vec<ModelInfo>,
    /// Always `available_models.len()`.
    pub count: usize,
}

impl ModelsResponse {
    pub fn new(available_models: Vec<ModelInfo>) -> Self {
        let count = available_models.len();
        Self { available_models, count }
    }
}
