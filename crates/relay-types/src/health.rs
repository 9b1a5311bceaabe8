//! Liveness payload (`GET /health`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    /// The default model identifier.
    pub active_model: String,
    /// Identifiers whose provider handle initialised successfully, sorted.
    pub available_models: Vec<String>,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn healthy(
        active_model: impl Into<String>,
        mut available_models: Vec<String>,
        version: impl Into<String>,
    ) -> Self {
        available_models.sort();
        available_models.dedup();
        Self {
            status: ServiceStatus::Healthy,
            active_model: active_model.into(),
            available_models,
            version: version.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}
