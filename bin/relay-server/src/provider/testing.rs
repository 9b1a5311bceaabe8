//! Canned provider used by unit and router tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relay_types::{ChatMessage, ModelInfo};

use super::{ChatModel, ModelProvider, ProviderError};

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub history: Vec<ChatMessage>,
    pub turn: String,
}

#[derive(Default)]
pub struct StubProvider {
    reply: String,
    generate_error: Option<String>,
    failing_models: HashSet<String>,
    missing_key: bool,
    models: Vec<ModelInfo>,
    list_error: Option<String>,
    pub opens: AtomicUsize,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
            ..Self::default()
        }
    }

    pub fn failing_open(mut self, model: &str) -> Self {
        self.failing_models.insert(model.to_owned());
        self
    }

    pub fn without_key(mut self) -> Self {
        self.missing_key = true;
        self
    }

    pub fn failing_generate(mut self, message: &str) -> Self {
        self.generate_error = Some(message.to_owned());
        self
    }

    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = models;
        self
    }

    pub fn failing_listing(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_owned());
        self
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn open(&self, model: &str) -> Result<Arc<dyn ChatModel>, ProviderError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.missing_key {
            return Err(ProviderError::MissingApiKey);
        }
        if self.failing_models.contains(model) {
            return Err(ProviderError::Api {
                status: 404,
                message: format!("models/{model} is not found"),
            });
        }
        Ok(Arc::new(StubModel {
            id: model.to_owned(),
            reply: match &self.generate_error {
                Some(message) => Err(message.clone()),
                None => Ok(self.reply.clone()),
            },
            calls: Arc::clone(&self.calls),
        }))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        if self.missing_key {
            return Err(ProviderError::MissingApiKey);
        }
        match &self.list_error {
            Some(message) => Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(self.models.clone()),
        }
    }
}

struct StubModel {
    id: String,
    reply: Result<String, String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[async_trait]
impl ChatModel for StubModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, history: &[ChatMessage], turn: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: self.id.clone(),
                history: history.to_vec(),
                turn: turn.to_owned(),
            });
        }
        self.reply.clone().map_err(|message| ProviderError::Api {
            status: 429,
            message,
        })
    }
}
