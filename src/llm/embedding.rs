//! HTTP embedding client for LLM providers

use crate::config::{EmbeddingConfig, LLMProvider};
use crate::llm::{EmbeddingService, LlmError, LlmResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for interacting with LLM APIs to generate embeddings
pub struct HttpEmbeddingClient {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: Option<String>,
    api_base_url: String,
    vector_dimension: usize,
}

impl HttpEmbeddingClient {
    /// Create a new embedding client based on configuration
    pub fn new(config: &EmbeddingConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        let api_base_url = config.api_base_url.clone().unwrap_or_else(|| {
            match config.provider {
                LLMProvider::OpenAI => "https://api.openai.com/v1".to_string(),
                LLMProvider::Groq => "https://api.groq.com/openai/v1".to_string(),
                LLMProvider::Ollama => "http://localhost:11434".to_string(),
            }
        });

        Ok(Self {
            client,
            provider: config.provider.clone(),
            model: config.embedding_model.clone(),
            api_key: config.api_key.clone(),
            api_base_url,
            vector_dimension: config.vector_dimension,
        })
    }

    fn check_dimensions(&self, vectors: &[Vec<f32>]) -> LlmResult<()> {
        for vector in vectors {
            if vector.len() != self.vector_dimension {
                return Err(LlmError::Api(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.vector_dimension,
                    vector.len()
                )));
            }
        }
        Ok(())
    }

    async fn openai_embeddings(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct Request<'a> {
            input: &'a [String],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            data: Vec<Data>,
        }

        #[derive(Deserialize)]
        struct Data {
            embedding: Vec<f32>,
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LlmError::Config("OpenAI requires API key".to_string()))?;

        let url = format!("{}/embeddings", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                input: texts,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("OpenAI returned error: {}", error_text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::Serialization(e.to_string()))?;
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn ollama_embeddings(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            embedding: Vec<f32>,
        }

        let mut results = Vec::new();
        for text in texts {
            let url = format!("{}/api/embeddings", self.api_base_url);
            let resp = self
                .client
                .post(&url)
                .json(&Request {
                    model: &self.model,
                    prompt: text,
                })
                .send()
                .await
                .map_err(|e| LlmError::Network(e.to_string()))?;

            if !resp.status().is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                return Err(LlmError::Api(format!("Ollama returned error: {}", error_text)));
            }

            let result: Response = resp
                .json()
                .await
                .map_err(|e| LlmError::Serialization(e.to_string()))?;
            results.push(result.embedding);
        }

        Ok(results)
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        let vectors = match self.provider {
            LLMProvider::OpenAI => self.openai_embeddings(texts).await?,
            LLMProvider::Ollama => self.ollama_embeddings(texts).await?,
            LLMProvider::Groq => {
                return Err(LlmError::Config(
                    "Groq does not provide an embeddings API".to_string(),
                ))
            }
        };
        self.check_dimensions(&vectors)?;
        Ok(vectors)
    }
}
