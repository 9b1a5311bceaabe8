//! Synthetic usage counters.
//!
//! These are whitespace word counts, not real tokenizer output.  Clients show
//! them as a rough gauge of conversation size.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chat::ChatMessage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn from_counts(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Count every request message (joined with single spaces) as the prompt
    /// and the generated text as the completion.
    pub fn from_exchange(messages: &[ChatMessage], completion: &str) -> Self {
        let prompt = messages
            .iter()
            .map(ChatMessage::content)
            .collect::<Vec<_>>()
            .join(" ");
        Self::from_counts(word_count(&prompt), word_count(completion))
    }
}

pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_words_not_tokens() {
        let messages = vec![
            ChatMessage::user("hello world").unwrap(),
            ChatMessage::assistant("hi").unwrap(),
        ];
        let usage = Usage::from_exchange(&messages, "hello there");
        assert_eq!(usage, Usage::from_counts(3, 2));
        assert_eq!(usage.total_tokens, 5);
    }

    #[test]
    fn irregular_whitespace_collapses() {
        assert_eq!(word_count("  a\t\tb\n\nc  "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("don't-split,punctuation"), 1);
    }

    #[test]
    fn empty_completion_counts_zero() {
        let messages = vec![ChatMessage::user("one two three").unwrap()];
        let usage = Usage::from_exchange(&messages, "");
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 3);
    }

    #[test]
    fn default_is_all_zero() {
        let usage = Usage::default();
        assert_eq!(usage.total_tokens, 0);
        assert_eq!(usage.prompt_tokens, 0);
    }
}
