//! Knowledge-graph extraction from free text
//!
//! Sends a text chunk to the completion service with a fixed instruction
//! template and parses the returned JSON into a candidate [`GraphPayload`].
//! Extraction failure must never abort the caller's pipeline: transient
//! service errors are retried a bounded number of times, and any remaining
//! failure degrades to an empty payload.

use crate::graph::GraphPayload;
use crate::llm::{ChatMessage, CompletionService, ResponseMode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

const EXTRACTION_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outcome of one extraction call.
///
/// `Degraded` means the call failed and the payload is empty; it is distinct
/// from a successful extraction that found nothing to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Extracted(GraphPayload),
    Degraded { reason: String },
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded { .. })
    }

    /// The candidate payload; empty for degraded extractions
    pub fn into_payload(self) -> GraphPayload {
        match self {
            Extraction::Extracted(payload) => payload,
            Extraction::Degraded { .. } => GraphPayload::default(),
        }
    }
}

/// Stateless extraction client over the completion service
pub struct GraphExtractor {
    completion: Arc<dyn CompletionService>,
    attempts: u32,
    retry_delay: Duration,
}

impl GraphExtractor {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            attempts: EXTRACTION_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the inter-attempt delay (tests run with `Duration::ZERO`)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Extract a candidate graph from one text chunk.
    ///
    /// Transient completion errors are retried up to the attempt budget with
    /// a fixed inter-attempt delay. A malformed JSON body is not retried:
    /// the model call already returned, so the same response would fail
    /// again, and extraction degrades immediately.
    pub async fn extract(&self, text_chunk: &str) -> Extraction {
        let messages = [ChatMessage::user(extraction_prompt(text_chunk))];

        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self
                .completion
                .complete(&messages, ResponseMode::JsonObject)
                .await
            {
                Ok(content) => {
                    let cleaned = strip_code_fences(&content);
                    return match serde_json::from_str::<GraphPayload>(&cleaned) {
                        Ok(payload) => Extraction::Extracted(payload),
                        Err(err) => {
                            error!("Graph extraction returned malformed JSON: {err}");
                            Extraction::Degraded {
                                reason: format!("malformed extraction payload: {err}"),
                            }
                        }
                    };
                }
                Err(err) => {
                    warn!(
                        "Graph extraction attempt {attempt}/{} failed: {err}",
                        self.attempts
                    );
                    last_error = Some(err);
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        let reason = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "completion service unavailable".to_string());
        error!("Graph extraction failed after {} attempts: {reason}", self.attempts);
        Extraction::Degraded { reason }
    }
}

fn extraction_prompt(text_chunk: &str) -> String {
    format!(
        r#"You are a Knowledge Graph extraction system.
Your task is to extract meaningful "Entities" (Nodes) and "Relationships" (Edges) from the given text.

Rules:
1. Nodes: Identify key people, organizations, locations, concepts, or products.
2. Relationships: Identify how these nodes are connected (e.g., "IS_CEO_OF", "LOCATED_IN", "PRODUCED_BY").
3. Output JSON ONLY. No markdown, no explanations.

Format:
{{
  "nodes": [
    {{"id": "Name of Entity", "type": "PERSON/ORG/ETC"}}
  ],
  "edges": [
    {{"source": "Name of Source Node", "target": "Name of Target Node", "relation": "RELATION_NAME"}}
  ]
}}

TEXT TO PROCESS:
{text_chunk}"#
    )
}

/// Remove markdown code-fence markers some models wrap around JSON output
pub(crate) fn strip_code_fences(response: &str) -> String {
    response
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
