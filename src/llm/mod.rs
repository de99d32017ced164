//! Completion and embedding service seam.
//!
//! The engine treats both models as pluggable external services reachable
//! through a single `complete` call and a single `embed` call. HTTP
//! implementations live in [`completion`] and [`embedding`]; tests inject
//! their own implementations of the traits.

pub mod completion;
pub mod embedding;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// A single message in a chat-style completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Requested response shape for a completion call.
///
/// Structured paths (graph extraction, query-entity parsing) request
/// `JsonObject`; answer generation requests free `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Text,
    JsonObject,
}

/// Generative completion service
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], mode: ResponseMode) -> LlmResult<String>;
}

/// Embedding service; the vector space must be consistent across
/// ingestion and query paths.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> LlmResult<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| LlmError::Api("embedding service returned no vectors".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_roles() {
        let system = ChatMessage::system("You are a helpful analyst.");
        assert_eq!(system.role, "system");

        let user = ChatMessage::user("What is Acme?");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "What is Acme?");
    }
}
