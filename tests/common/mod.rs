//! Mock completion/embedding services shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use smriti::{ChatMessage, CompletionService, EmbeddingService, LlmError, LlmResult, ResponseMode};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Completion service that replays a fixed script of responses and records
/// every user prompt it was sent.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<LlmResult<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<LlmResult<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, messages: &[ChatMessage], _mode: ResponseMode) -> LlmResult<String> {
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

/// Deterministic embedding derived from text bytes: the same text always
/// maps to the same vector, which is all the engine paths need.
pub struct HashEmbedding {
    pub dimension: usize,
}

#[async_trait]
impl EmbeddingService for HashEmbedding {
    async fn embed(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                (0..self.dimension)
                    .map(|i| {
                        let mut acc: u32 = 0;
                        for (j, byte) in text.bytes().enumerate() {
                            acc = acc
                                .wrapping_add((byte as u32).wrapping_mul((i + j + 1) as u32));
                        }
                        (acc % 997) as f32 / 997.0
                    })
                    .collect()
            })
            .collect())
    }
}
