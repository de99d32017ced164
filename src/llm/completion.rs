//! HTTP completion client for LLM providers

use crate::config::{CompletionConfig, LLMProvider};
use crate::llm::{ChatMessage, CompletionService, LlmError, LlmResult, ResponseMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct HttpCompletionClient {
    client: Client,
    config: CompletionConfig,
    api_base_url: String,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
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
            config: config.clone(),
            api_base_url,
        })
    }

    async fn openai_compatible_chat(
        &self,
        messages: &[ChatMessage],
        mode: ResponseMode,
    ) -> LlmResult<String> {
        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            format: &'static str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_format: Option<ResponseFormat>,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: String,
        }

        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            LlmError::Config(format!("{:?} requires an API key", self.config.provider))
        })?;

        let response_format = match mode {
            ResponseMode::JsonObject => Some(ResponseFormat {
                format: "json_object",
            }),
            ResponseMode::Text => None,
        };

        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages,
                temperature: self.config.temperature,
                response_format,
            })
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!(
                "{:?} error: {}",
                self.config.provider,
                resp.status()
            )));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::Serialization(e.to_string()))?;
        Ok(result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    async fn ollama_chat(&self, messages: &[ChatMessage], mode: ResponseMode) -> LlmResult<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            format: Option<&'static str>,
        }

        #[derive(Deserialize)]
        struct Response {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: String,
        }

        let format = match mode {
            ResponseMode::JsonObject => Some("json"),
            ResponseMode::Text => None,
        };

        let url = format!("{}/api/chat", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: &self.config.model,
                messages,
                stream: false,
                format,
            })
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| LlmError::Serialization(e.to_string()))?;
        Ok(result.message.content)
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(&self, messages: &[ChatMessage], mode: ResponseMode) -> LlmResult<String> {
        match self.config.provider {
            LLMProvider::OpenAI | LLMProvider::Groq => {
                self.openai_compatible_chat(messages, mode).await
            }
            LLMProvider::Ollama => self.ollama_chat(messages, mode).await,
        }
    }
}
