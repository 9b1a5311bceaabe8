//! Language-model provider capability.
//!
//! The relay only needs two things from a provider: a per-model handle that
//! can turn `(history, new turn)` into text, and a model listing.  The real
//! implementation is [`gemini::GeminiProvider`]; tests plug in canned doubles.

pub mod gemini;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use relay_types::{ChatMessage, ModelInfo};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors surfaced by a provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential configured; nothing provider-backed can work.
    #[error("GOOGLE_API_KEY is not configured")]
    MissingApiKey,

    /// Transport failure (DNS, TLS, timeout, connection reset, …).
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the provider's own error text.
    #[error("{status} {message}")]
    Api { status: u16, message: String },

    /// The provider answered but produced no text (e.g. safety block).
    #[error("provider returned no text: {0}")]
    EmptyResponse(String),

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

/// A ready handle for one model identifier.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn id(&self) -> &str;

    /// Submit `turn` as the new user message on top of `history`.
    async fn generate(&self, history: &[ChatMessage], turn: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Initialise a handle for `model`.  Called at most once per identifier
    /// by the registry, barring races.
    async fn open(&self, model: &str) -> Result<Arc<dyn ChatModel>, ProviderError>;

    /// Every model the provider exposes, not only the allow-listed ones.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;
}
