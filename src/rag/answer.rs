//! Answer generation with bounded retries
//!
//! Assembles retrieved context into a prompt and calls the completion
//! service under exponential backoff. This contract always returns a
//! string: on retry exhaustion the caller receives a user-visible error
//! message in place of an answer.

use crate::llm::{ChatMessage, CompletionService, ResponseMode};
use crate::rag::passage::Passage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const GENERATION_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Separator between passage texts in the context block
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Fixed phrase the model is instructed to emit when the answer is absent
/// from the provided context
pub const NO_ANSWER_PHRASE: &str = "I cannot find the answer in the provided context.";

pub struct AnswerGenerator {
    completion: Arc<dyn CompletionService>,
    attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl AnswerGenerator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            attempts: GENERATION_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }

    /// Override the backoff schedule (tests run with `Duration::ZERO`)
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Generate an answer from the retrieved context. `graph_context` is the
    /// rendered graph block; empty means no graph context was available.
    pub async fn generate(
        &self,
        query: &str,
        context_chunks: &[Passage],
        graph_context: &str,
    ) -> String {
        info!("Generating answer using {} chunks", context_chunks.len());

        let context_text = assemble_context(context_chunks, graph_context);
        let prompt = answer_prompt(query, &context_text);
        let messages = [
            ChatMessage::system("You are a helpful analyst."),
            ChatMessage::user(prompt),
        ];

        let mut backoff = self.initial_backoff;
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self.completion.complete(&messages, ResponseMode::Text).await {
                Ok(answer) => {
                    info!("Answer generated.");
                    return answer;
                }
                Err(err) => {
                    warn!(
                        "Answer generation attempt {attempt}/{} failed: {err}",
                        self.attempts
                    );
                    last_error = Some(err);
                    if attempt < self.attempts {
                        tokio::time::sleep(backoff).await;
                        backoff = (backoff * 2).min(self.max_backoff);
                    }
                }
            }
        }

        let reason = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "completion service unavailable".to_string());
        error!("Answer generation failed after {} attempts: {reason}", self.attempts);
        format!(
            "Error: The AI service is currently unavailable. Please try again later. ({reason})"
        )
    }
}

fn assemble_context(context_chunks: &[Passage], graph_context: &str) -> String {
    let passage_block = context_chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);

    if graph_context.is_empty() {
        passage_block
    } else if passage_block.is_empty() {
        graph_context.to_string()
    } else {
        format!("{graph_context}{CHUNK_SEPARATOR}{passage_block}")
    }
}

fn answer_prompt(query: &str, context_text: &str) -> String {
    format!(
        r#"You are an expert document analyst AI.
Answer the user's question based *only* on the context provided below.
If the answer is not found in the context, say "{NO_ANSWER_PHRASE}"

CONTEXT:
---
{context_text}
---

QUESTION:
{query}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, LlmResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedCompletion {
        responses: Mutex<VecDeque<LlmResult<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn new(responses: Vec<LlmResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _mode: ResponseMode,
        ) -> LlmResult<String> {
            if let Some(user) = messages.iter().find(|m| m.role == "user") {
                self.prompts.lock().unwrap().push(user.content.clone());
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Api("script exhausted".to_string())))
        }
    }

    fn passage(text: &str) -> Passage {
        Passage {
            text: text.to_string(),
            embedding: vec![0.0],
            document_id: 1,
        }
    }

    fn generator(service: Arc<ScriptedCompletion>) -> AnswerGenerator {
        AnswerGenerator::new(service).with_backoff(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_generate_returns_model_answer() {
        let service = Arc::new(ScriptedCompletion::new(vec![Ok(
            "Alice is the CEO of Acme.".to_string(),
        )]));
        let answer = generator(service.clone())
            .generate("Who runs Acme?", &[passage("Alice is CEO of Acme.")], "")
            .await;

        assert_eq!(answer, "Alice is the CEO of Acme.");

        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].contains("Alice is CEO of Acme."));
        assert!(prompts[0].contains("Who runs Acme?"));
    }

    #[tokio::test]
    async fn test_context_includes_graph_block_and_separator() {
        let service = Arc::new(ScriptedCompletion::new(vec![Ok("ok".to_string())]));
        generator(service.clone())
            .generate(
                "q",
                &[passage("chunk one"), passage("chunk two")],
                "Knowledge Graph Connections:\nAlice --[IS_CEO_OF]--> Acme",
            )
            .await;

        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].contains("Knowledge Graph Connections:"));
        assert!(prompts[0].contains("chunk one\n\n---\n\nchunk two"));
    }

    #[tokio::test]
    async fn test_zero_context_still_prompts_with_fallback_phrase() {
        let service = Arc::new(ScriptedCompletion::new(vec![Ok(
            NO_ANSWER_PHRASE.to_string()
        )]));
        let answer = generator(service.clone()).generate("q", &[], "").await;

        assert_eq!(answer, NO_ANSWER_PHRASE);
        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].contains(NO_ANSWER_PHRASE));
    }

    #[tokio::test]
    async fn test_transient_failure_retried_then_succeeds() {
        let service = Arc::new(ScriptedCompletion::new(vec![
            Err(LlmError::Network("reset".to_string())),
            Ok("answer".to_string()),
        ]));
        let answer = generator(service).generate("q", &[], "").await;
        assert_eq!(answer, "answer");
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_error_string() {
        let service = Arc::new(ScriptedCompletion::new(vec![
            Err(LlmError::Network("down".to_string())),
            Err(LlmError::Network("down".to_string())),
            Err(LlmError::Network("down".to_string())),
        ]));
        let answer = generator(service).generate("q", &[], "").await;

        assert!(answer.starts_with("Error: The AI service is currently unavailable."));
        assert!(answer.contains("down"));
    }
}
