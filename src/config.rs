//! Configuration for the completion and embedding services.

use serde::{Deserialize, Serialize};

/// Default sampling temperature for completion calls.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// LLM Provider options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    OpenAI,
    Groq,
    Ollama,
}

/// Configuration for the completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// The LLM provider to use
    pub provider: LLMProvider,
    /// Model name (e.g., "gpt-4o", "llama-3.1-8b-instant")
    pub model: String,
    /// API Key (optional, can be loaded from env if None)
    pub api_key: Option<String>,
    /// API Base URL (required for self-hosted Ollama, optional for others)
    pub api_base_url: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl CompletionConfig {
    pub fn new(provider: LLMProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            api_base_url: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Configuration for the embedding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// The LLM provider to use
    pub provider: LLMProvider,
    /// Model name (e.g., "text-embedding-3-small", "all-minilm")
    pub embedding_model: String,
    /// API Key (optional, can be loaded from env if None)
    pub api_key: Option<String>,
    /// API Base URL (required for self-hosted Ollama, optional for others)
    pub api_base_url: Option<String>,
    /// Vector dimension size; must match across ingestion and query paths
    pub vector_dimension: usize,
}

impl EmbeddingConfig {
    pub fn new(
        provider: LLMProvider,
        embedding_model: impl Into<String>,
        vector_dimension: usize,
    ) -> Self {
        Self {
            provider,
            embedding_model: embedding_model.into(),
            api_key: None,
            api_base_url: None,
            vector_dimension,
        }
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
