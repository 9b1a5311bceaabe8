//! Relay HTTP surface as a trait, plus the reqwest implementation.

use async_trait::async_trait;
use relay_types::{ChatRequest, ChatResponse, HealthStatus, ModelsResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:8000";

#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, ClientError>;
    async fn health(&self) -> Result<HealthStatus, ClientError>;
    async fn list_models(&self) -> Result<ModelsResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url: String = base_url.into();
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, ClientError> {
        debug!(messages = req.messages.len(), model = ?req.model, "POST /chat");
        let response = self.http.post(self.url("/chat")).json(req).send().await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        read_json(response).await
    }

    async fn list_models(&self) -> Result<ModelsResponse, ClientError> {
        let response = self.http.get(self.url("/models")).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await?;
    Err(ClientError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_owned())
}
