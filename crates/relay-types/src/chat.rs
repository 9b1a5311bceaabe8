//! Chat request / response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::usage::Usage;

/// Author of a message in the conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single conversation message.  `content` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatMessage {
    /// Who wrote the message.
    role: Role,
    /// Message text; must contain at least one non-whitespace character.
    content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(Self { role, content })
    }

    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::System, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Deserialize)]
struct RawChatMessage {
    role: Role,
    content: String,
}

// JSON input goes through the same check as `ChatMessage::new`.
impl<'de> Deserialize<'de> for ChatMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawChatMessage::deserialize(deserializer)?;
        ChatMessage::new(raw.role, raw.content).map_err(serde::de::Error::custom)
    }
}

/// Request body for `POST /chat`.
///
/// The last message is the new turn; everything before it is prior history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Full conversation, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Requested model identifier; unknown values fall back to the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, model: None }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.messages.is_empty() {
            return Err(ValidationError::NoMessages);
        }
        Ok(())
    }

    /// Split into `(history, new_turn)`.
    pub fn split_turn(&self) -> Result<(&[ChatMessage], &ChatMessage), ValidationError> {
        self.messages
            .split_last()
            .map(|(last, history)| (history, last))
            .ok_or(ValidationError::NoMessages)
    }
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Generated reply text.
    pub response: String,
    /// Approximate word-count usage for this exchange.
    #[serde(default)]
    pub usage: Option<Usage>,
    /// When the relay produced the response.
    pub created_at: DateTime<Utc>,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>, usage: Option<Usage>) -> Self {
        Self {
            response: response.into(),
            usage,
            created_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
