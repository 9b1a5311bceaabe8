use thiserror::Error;

/// Rejections raised while building chat values, before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A message whose content is empty or whitespace only.
    #[error("Content cannot be empty")]
    EmptyContent,

    /// A chat request without a single message.
    #[error("No messages provided")]
    NoMessages,
}
