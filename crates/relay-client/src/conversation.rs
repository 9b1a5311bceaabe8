//! Conversation state held by the caller.
//!
//! Every turn resubmits the full history.  A failed turn keeps the user's
//! message, records an apology as the reply ([`APOLOGY`] when the relay
//! rejected the turn, [`CONNECTION_APOLOGY`] when it could not be reached)
//! and leaves the usage counters untouched.

use relay_types::{ChatMessage, ChatRequest, HealthStatus, Usage, ValidationError};
use tracing::warn;

use crate::api::RelayApi;
use crate::error::ClientError;

/// Reply shown in place of the model's answer when a turn fails.
pub const APOLOGY: &str = "Sorry, I encountered an error while processing your request.";

/// Reply shown when the relay could not be reached or its answer not read.
pub const CONNECTION_APOLOGY: &str = "Sorry, I couldn't connect to the backend service.";

/// Result of one turn: the text to display and, on failure, why.
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub error: Option<ClientError>,
}

impl TurnOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    usage: Usage,
}

impl Conversation {
    pub fn new(model: Option<String>) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Usage reported by the most recent successful turn.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Append `text` as a user turn, submit the whole history, record the reply.
    ///
    /// Blank input is rejected before anything is sent or recorded.
    pub async fn send<A>(&mut self, api: &A, text: &str) -> Result<TurnOutcome, ValidationError>
    where
        A: RelayApi + ?Sized,
    {
        self.messages.push(ChatMessage::user(text)?);

        let mut req = ChatRequest::new(self.messages.clone());
        if let Some(model) = &self.model {
            req = req.with_model(model.clone());
        }

        let outcome = match api.chat(&req).await {
            Ok(resp) => {
                if let Some(usage) = resp.usage {
                    self.usage = usage;
                }
                TurnOutcome {
                    reply: resp.response,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                let reply = match &e {
                    ClientError::Http(_) => CONNECTION_APOLOGY,
                    ClientError::Status { .. } => APOLOGY,
                };
                TurnOutcome {
                    reply: reply.to_owned(),
                    error: Some(e),
                }
            }
        };

        // A blank reply cannot be stored as a message; it is still displayed.
        if let Ok(reply) = ChatMessage::assistant(outcome.reply.as_str()) {
            self.messages.push(reply);
        }
        Ok(outcome)
    }

    /// Forget history and usage.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.usage = Usage::default();
    }

    /// Select another model.  History and usage do not carry across models.
    ///
    /// Returns `false` (and keeps state) when `model` is already selected.
    pub fn switch_model(&mut self, model: impl Into<String>) -> bool {
        let model = model.into();
        if self.model.as_deref() == Some(model.as_str()) {
            return false;
        }
        self.model = Some(model);
        self.clear();
        true
    }
}

/// What a UI shows about the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceIndicator {
    Healthy { model: String, version: String },
    Degraded,
}

impl ServiceIndicator {
    pub fn from_health(health: &HealthStatus) -> Self {
        if health.is_healthy() {
            ServiceIndicator::Healthy {
                model: health.active_model.clone(),
                version: health.version.clone(),
            }
        } else {
            ServiceIndicator::Degraded
        }
    }

    /// Unreachable relays and non-2xx answers both count as degraded.
    pub async fn probe<A>(api: &A) -> Self
    where
        A: RelayApi + ?Sized,
    {
        match api.health().await {
            Ok(health) => Self::from_health(&health),
            Err(e) => {
                warn!(error = %e, "health probe failed");
                ServiceIndicator::Degraded
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
