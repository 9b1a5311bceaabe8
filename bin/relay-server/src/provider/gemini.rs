//! Google Generative Language API (`v1beta`) adapter.
//!
//! Role mapping: `user → "user"`, `assistant → "model"`.  System messages in
//! the history are lifted into `systemInstruction`, keeping their order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relay_types::{ChatMessage, ModelInfo, Role};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, ModelProvider, ProviderError};
use crate::config::{ApiKey, Config};

const API_KEY_HEADER: &str = "x-goog-api-key";
const LIST_PAGE_SIZE: &str = "1000";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<RemoteModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// Shared HTTP client plus credential; hands out [`GeminiModel`] handles.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<ApiKey>,
}

impl GeminiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<ApiKey>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ProviderError> {
        Self::new(
            cfg.provider_base_url.clone(),
            cfg.api_key.clone(),
            cfg.provider_timeout,
        )
    }

    fn require_key(&self) -> Result<&ApiKey, ProviderError> {
        self.api_key.as_ref().ok_or(ProviderError::MissingApiKey)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn open(&self, model: &str) -> Result<Arc<dyn ChatModel>, ProviderError> {
        let api_key = self.require_key()?.clone();
        Ok(Arc::new(GeminiModel {
            client: self.client.clone(),
            endpoint: format!("{}/v1beta/models/{}:generateContent", self.base_url, model),
            api_key,
            model: model.to_owned(),
        }))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let api_key = self.require_key()?;
        let endpoint = format!("{}/v1beta/models", self.base_url);

        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![("pageSize", LIST_PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let url = Url::parse_with_params(&endpoint, &params)
                .map_err(|e| ProviderError::Decode(format!("invalid provider URL: {e}")))?;

            let response = self
                .client
                .get(url)
                .header(API_KEY_HEADER, api_key.expose())
                .send()
                .await?;
            let page: ListModelsResponse = read_json(response).await?;

            models.extend(page.models.into_iter().map(into_model_info));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(count = models.len(), "listed provider models");
        Ok(models)
    }
}

/// Handle for a single Gemini model.
#[derive(Debug)]
pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    model: String,
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, history: &[ChatMessage], turn: &str) -> Result<String, ProviderError> {
        let body = build_request(history, turn);
        debug!(model = %self.model, contents = body.contents.len(), "calling generateContent");

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let reply: GenerateContentResponse = read_json(response).await?;
        extract_text(reply)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn build_request<'a>(history: &'a [ChatMessage], turn: &'a str) -> GenerateContentRequest<'a> {
    let mut contents = Vec::with_capacity(history.len() + 1);
    let mut system_parts = Vec::new();

    for msg in history {
        let part = Part { text: msg.content() };
        match msg.role() {
            Role::User => contents.push(Content { role: "user", parts: vec![part] }),
            Role::Assistant => contents.push(Content { role: "model", parts: vec![part] }),
            Role::System => system_parts.push(part),
        }
    }
    contents.push(Content {
        role: "user",
        parts: vec![Part { text: turn }],
    });

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty())
            .then(|| SystemInstruction { parts: system_parts }),
    }
}

fn extract_text(reply: GenerateContentResponse) -> Result<String, ProviderError> {
    let block_reason = reply.prompt_feedback.and_then(|f| f.block_reason);
    let Some(candidate) = reply.candidates.into_iter().next() else {
        let reason = block_reason.unwrap_or_else(|| "no candidates".to_owned());
        return Err(ProviderError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty candidate".to_owned());
        return Err(ProviderError::EmptyResponse(reason));
    }
    Ok(text)
}

fn into_model_info(remote: RemoteModel) -> ModelInfo {
    ModelInfo {
        display_name: remote.display_name.unwrap_or_else(|| remote.name.clone()),
        name: remote.name,
        description: remote.description.filter(|d| !d.is_empty()),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_owned())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
