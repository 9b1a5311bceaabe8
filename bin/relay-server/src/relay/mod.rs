//! The relay: model resolution, history formatting, usage accounting.
//!
//! Nothing here keeps conversation state.  The only shared mutable piece is
//! the [`ModelRegistry`] of provider handles.

mod registry;

use std::sync::Arc;

use relay_types::{ChatRequest, ChatResponse, HealthStatus, ModelInfo, Usage, ValidationError};
use thiserror::Error;
use tracing::{debug, info, warn};

use registry::ModelRegistry;

use crate::config::Config;
use crate::provider::{ModelProvider, ProviderError};

/// Version string reported by `GET /health`.
pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No usable model handle (missing credential, failed initialisation).
    #[error("{0}")]
    ServiceUnavailable(String),

    /// The provider call itself failed; carries the provider's error text.
    #[error("{0}")]
    Upstream(String),
}

impl RelayError {
    fn model_unavailable(model: &str) -> Self {
        RelayError::ServiceUnavailable(format!(
            "Model {model} is not available. Please check your API key and permissions."
        ))
    }
}

pub struct RelayService {
    provider: Arc<dyn ModelProvider>,
    registry: ModelRegistry,
    default_model: String,
    supported_models: Vec<String>,
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("registry", &self.registry)
            .field("default_model", &self.default_model)
            .field("supported_models", &self.supported_models)
            .finish_non_exhaustive()
    }
}

impl RelayService {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        default_model: impl Into<String>,
        supported_models: Vec<String>,
    ) -> Self {
        Self {
            registry: ModelRegistry::new(Arc::clone(&provider)),
            provider,
            default_model: default_model.into(),
            supported_models,
        }
    }

    pub fn from_config(cfg: &Config, provider: Arc<dyn ModelProvider>) -> Self {
        Self::new(provider, cfg.default_model.clone(), cfg.supported_models.clone())
    }

    /// Initialise the default model's handle ahead of the first request.
    /// Failure is recorded in the registry and does not stop the server.
    pub async fn warm_up(&self) {
        match self.registry.get_or_init(&self.default_model).await {
            Ok(_) => info!(model = %self.default_model, "using default model"),
            Err(reason) => warn!(
                model = %self.default_model,
                %reason,
                "default model unavailable; chat requests will fail until restart"
            ),
        }
    }

    /// Map the requested identifier onto the allow-list.
    ///
    /// Unsupported identifiers silently become the default; callers are never
    /// rejected for naming an unknown model.
    pub fn resolve_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(model) if self.supported_models.iter().any(|m| m == model) => model,
            Some(model) => {
                warn!(requested = model, fallback = %self.default_model, "unsupported model; falling back");
                &self.default_model
            }
            None => &self.default_model,
        }
    }

    pub async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, RelayError> {
        let (history, turn) = req.split_turn()?;
        let model = self.resolve_model(req.model.as_deref());

        let handle = match self.registry.get_or_init(model).await {
            Ok(handle) => handle,
            Err(reason) if model != self.default_model => {
                warn!(requested = model, fallback = %self.default_model, %reason, "model initialisation failed; falling back");
                self.registry
                    .get_or_init(&self.default_model)
                    .await
                    .map_err(|_| RelayError::model_unavailable(&self.default_model))?
            }
            Err(_) => return Err(RelayError::model_unavailable(model)),
        };

        debug!(model = handle.id(), history = history.len(), "forwarding turn to provider");
        let text = handle
            .generate(history, turn.content())
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let usage = Usage::from_exchange(&req.messages, &text);
        info!(
            model = handle.id(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat turn completed"
        );
        Ok(ChatResponse::new(text, Some(usage)))
    }

    /// Liveness snapshot; never consults the provider.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::healthy(&self.default_model, self.registry.ready_models(), API_VERSION)
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, RelayError> {
        self.provider.list_models().await.map_err(|e| match e {
            ProviderError::MissingApiKey => {
                RelayError::ServiceUnavailable(format!("Model listing is not available: {e}"))
            }
            other => RelayError::Upstream(other.to_string()),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::provider::testing::StubProvider;
    use relay_types::{ChatMessage, Role, ServiceStatus};
    use tracing_test::traced_test;

    const DEFAULT: &str = "gemini-1.5-flash";

    fn supported() -> Vec<String> {
        vec![DEFAULT.to_owned(), "gemini-1.5-pro".to_owned()]
    }

    fn relay(provider: &Arc<StubProvider>) -> RelayService {
        RelayService::new(provider.clone(), DEFAULT, supported())
    }

    fn conversation() -> ChatRequest {
        ChatRequest::new(vec![
            ChatMessage::user("a").unwrap(),
            ChatMessage::assistant("b").unwrap(),
            ChatMessage::user("c").unwrap(),
        ])
    }

    #[tokio::test]
    async fn empty_request_is_a_validation_error() {
        let provider = Arc::new(StubProvider::replying("never"));
        let err = relay(&provider).chat(&ChatRequest::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, RelayError::Validation(ValidationError::NoMessages)));
        assert!(provider.recorded().is_empty());
        assert_eq!(provider.opens.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_and_turn_are_split() {
        let provider = Arc::new(StubProvider::replying("d"));
        relay(&provider).chat(&conversation()).await.unwrap();

        let calls = provider.recorded();
        assert_eq!(calls.len(), 1);
        let roles: Vec<Role> = calls[0].history.iter().map(ChatMessage::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(calls[0].history[0].content(), "a");
        assert_eq!(calls[0].history[1].content(), "b");
        assert_eq!(calls[0].turn, "c");
    }

    #[tokio::test]
    async fn usage_is_whitespace_word_count() {
        let provider = Arc::new(StubProvider::replying("hello there"));
        let req = ChatRequest::new(vec![
            ChatMessage::user("hello world").unwrap(),
            ChatMessage::user("hi").unwrap(),
        ]);
        let resp = relay(&provider).chat(&req).await.unwrap();
        assert_eq!(resp.response, "hello there");
        assert_eq!(resp.usage, Some(Usage::from_counts(3, 2)));
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(5));
    }

    #[tokio::test]
    #[traced_test]
    async fn unsupported_model_falls_back_to_default() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let resp = relay(&provider)
            .chat(&conversation().with_model("gpt-4"))
            .await
            .unwrap();
        assert_eq!(resp.response, "ok");
        assert_eq!(provider.recorded()[0].model, DEFAULT);
        assert!(logs_contain("unsupported model; falling back"));
    }

    #[tokio::test]
    async fn supported_model_is_used_as_requested() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let relay = relay(&provider);
        relay.chat(&conversation().with_model("gemini-1.5-pro")).await.unwrap();
        assert_eq!(provider.recorded()[0].model, "gemini-1.5-pro");
        assert_eq!(relay.health().available_models, vec!["gemini-1.5-pro".to_owned()]);
    }

    #[tokio::test]
    async fn failed_initialisation_falls_back_to_default() {
        let provider = Arc::new(StubProvider::replying("ok").failing_open("gemini-1.5-pro"));
        let relay = relay(&provider);
        relay.chat(&conversation().with_model("gemini-1.5-pro")).await.unwrap();
        assert_eq!(provider.recorded()[0].model, DEFAULT);
        assert_eq!(relay.health().available_models, vec![DEFAULT.to_owned()]);
    }

    #[tokio::test]
    async fn missing_credential_is_service_unavailable() {
        let provider = Arc::new(StubProvider::replying("ok").without_key());
        let relay = relay(&provider);
        relay.warm_up().await;

        let err = relay.chat(&conversation().with_model("gemini-1.5-pro")).await.unwrap_err();
        assert!(matches!(err, RelayError::ServiceUnavailable(_)));
        assert!(err.to_string().contains(DEFAULT));

        let err = relay.list_models().await.unwrap_err();
        assert!(matches!(err, RelayError::ServiceUnavailable(_)));

        let health = relay.health();
        assert_eq!(health.status, ServiceStatus::Healthy);
        assert!(health.available_models.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_text_is_passed_through() {
        let provider = Arc::new(StubProvider::replying("ok").failing_generate("Resource has been exhausted"));
        let err = relay(&provider).chat(&conversation()).await.unwrap_err();
        match err {
            RelayError::Upstream(text) => assert_eq!(text, "429 Resource has been exhausted"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeated_calls_are_independent() {
        let provider = Arc::new(StubProvider::replying("same"));
        let relay = relay(&provider);
        let req = conversation();
        let first = relay.chat(&req).await.unwrap();
        let second = relay.chat(&req).await.unwrap();
        assert_eq!(first.usage, second.usage);

        let calls = provider.recorded();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].history, calls[1].history);
        assert_eq!(provider.opens.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn warm_up_marks_default_ready() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let relay = relay(&provider);
        assert!(relay.health().available_models.is_empty());
        relay.warm_up().await;
        let health = relay.health();
        assert_eq!(health.active_model, DEFAULT);
        assert_eq!(health.available_models, vec![DEFAULT.to_owned()]);
        assert_eq!(health.version, API_VERSION);
    }

    #[tokio::test]
    async fn listing_is_not_limited_to_allow_list() {
        let models = vec![ModelInfo {
            name: "models/text-bison-001".into(),
            display_name: "PaLM 2".into(),
            description: None,
        }];
        let provider = Arc::new(StubProvider::replying("ok").with_models(models.clone()));
        assert_eq!(relay(&provider).list_models().await.unwrap(), models);

        let provider = Arc::new(StubProvider::replying("ok").failing_listing("backend down"));
        let err = relay(&provider).list_models().await.unwrap_err();
        assert_eq!(err.to_string(), "503 backend down");
    }

    #[test]
    fn absent_model_resolves_to_default_quietly() {
        let provider = Arc::new(StubProvider::replying("ok"));
        let relay = relay(&provider);
        assert_eq!(relay.resolve_model(None), DEFAULT);
        assert_eq!(relay.resolve_model(Some("gemini-1.5-pro")), "gemini-1.5-pro");
        assert_eq!(relay.resolve_model(Some("")), DEFAULT);
    }
}
