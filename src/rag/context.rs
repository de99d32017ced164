//! GraphRAG context assembly
//!
//! Extracts candidate entity names from a user query via the completion
//! service, searches the graph store for 1-hop neighborhoods, and renders
//! the result as a text block. Graph context is optional, never required:
//! every failure path here returns the empty string.

use crate::extract::strip_code_fences;
use crate::graph::{DocumentId, GraphStore};
use crate::llm::{ChatMessage, CompletionService, LlmError, LlmResult, ResponseMode};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Fixed cap on neighbor rows, bounding context size and query cost
pub const NEIGHBOR_LIMIT: usize = 20;

const CONTEXT_HEADER: &str = "Knowledge Graph Connections:";

pub struct GraphContextBuilder {
    completion: Arc<dyn CompletionService>,
    graph: Arc<RwLock<GraphStore>>,
}

impl GraphContextBuilder {
    pub fn new(completion: Arc<dyn CompletionService>, graph: Arc<RwLock<GraphStore>>) -> Self {
        Self { completion, graph }
    }

    /// Build the graph-context block for a query. The empty string means
    /// "no graph context available".
    pub async fn build(&self, query_text: &str, document_id: Option<DocumentId>) -> String {
        let entities = match self.extract_query_entities(query_text).await {
            Ok(entities) => entities,
            Err(err) => {
                error!("Failed to extract entities for graph context: {err}");
                return String::new();
            }
        };
        if entities.is_empty() {
            return String::new();
        }
        info!("Graph context searching for entities: {entities:?}");

        let triples = self
            .graph
            .read()
            .await
            .find_neighbors(&entities, document_id, NEIGHBOR_LIMIT);
        if triples.is_empty() {
            return String::new();
        }

        let lines: Vec<String> = triples
            .iter()
            .map(|t| format!("{} --[{}]--> {}", t.source, t.relation, t.target))
            .collect();
        info!("Graph context found {} connections", lines.len());

        format!("{CONTEXT_HEADER}\n{}", lines.join("\n"))
    }

    async fn extract_query_entities(&self, query_text: &str) -> LlmResult<Vec<String>> {
        let prompt = format!(
            r#"Extract key entities (Company, Person, Product, Concept) from this question.
Return ONLY a JSON list of strings.
Example: ["NVIDIA", "Jensen Huang"]

Question: {query_text}"#
        );

        let content = self
            .completion
            .complete(&[ChatMessage::user(prompt)], ResponseMode::JsonObject)
            .await?;
        let cleaned = strip_code_fences(&content);
        let value: Value =
            serde_json::from_str(&cleaned).map_err(|e| LlmError::Serialization(e.to_string()))?;
        Ok(entity_names(&value))
    }
}

/// Resolve the variable shapes models return entity lists in: an `entities`
/// key, a `keywords` key, the first value of whatever object keys are
/// present, or a bare array.
pub(crate) fn entity_names(value: &Value) -> Vec<String> {
    let list = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get("entities")
            .or_else(|| map.get("keywords"))
            .or_else(|| map.values().next())
            .and_then(Value::as_array),
        _ => None,
    };

    list.map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeSpec, GraphPayload, NodeSpec};
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedCompletion {
        response: LlmResult<String>,
    }

    #[async_trait]
    impl CompletionService for FixedCompletion {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _mode: ResponseMode,
        ) -> LlmResult<String> {
            self.response.clone()
        }
    }

    fn populated_graph() -> Arc<RwLock<GraphStore>> {
        let mut store = GraphStore::new();
        let payload = GraphPayload {
            nodes: vec![
                NodeSpec::new("Alice", "PERSON"),
                NodeSpec::new("Acme", "ORG"),
            ],
            edges: vec![EdgeSpec::new("Alice", "Acme", "IS_CEO_OF")],
        };
        store.upsert_graph(1, &payload);
        Arc::new(RwLock::new(store))
    }

    fn builder(response: LlmResult<String>) -> GraphContextBuilder {
        GraphContextBuilder::new(Arc::new(FixedCompletion { response }), populated_graph())
    }

    #[test]
    fn test_entity_names_prefers_entities_key() {
        let value = json!({"entities": ["Acme"], "keywords": ["other"]});
        assert_eq!(entity_names(&value), vec!["Acme"]);
    }

    #[test]
    fn test_entity_names_falls_back_to_keywords() {
        let value = json!({"keywords": ["Acme", "Alice"]});
        assert_eq!(entity_names(&value), vec!["Acme", "Alice"]);
    }

    #[test]
    fn test_entity_names_falls_back_to_first_value() {
        let value = json!({"things": ["Acme"]});
        assert_eq!(entity_names(&value), vec!["Acme"]);
    }

    #[test]
    fn test_entity_names_accepts_bare_array() {
        let value = json!(["Acme", "Alice"]);
        assert_eq!(entity_names(&value), vec!["Acme", "Alice"]);
    }

    #[test]
    fn test_entity_names_ignores_non_string_items() {
        let value = json!({"entities": ["Acme", 7, null]});
        assert_eq!(entity_names(&value), vec!["Acme"]);
    }

    #[test]
    fn test_entity_names_empty_for_scalar() {
        assert!(entity_names(&json!("Acme")).is_empty());
    }

    #[tokio::test]
    async fn test_build_renders_neighborhood() {
        let context = builder(Ok(r#"{"entities": ["acme"]}"#.to_string()))
            .build("Who runs Acme?", Some(1))
            .await;

        assert!(context.starts_with(CONTEXT_HEADER));
        assert!(context.contains("Acme --[IS_CEO_OF]--> Alice"));
    }

    #[tokio::test]
    async fn test_build_empty_when_no_entities() {
        let context = builder(Ok(r#"{"entities": []}"#.to_string()))
            .build("anything", Some(1))
            .await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_build_empty_when_no_neighbors() {
        let context = builder(Ok(r#"{"entities": ["Globex"]}"#.to_string()))
            .build("anything", Some(1))
            .await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_build_empty_on_completion_error() {
        let context = builder(Err(LlmError::Network("down".to_string())))
            .build("anything", Some(1))
            .await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_build_empty_on_malformed_response() {
        let context = builder(Ok("not json".to_string()))
            .build("anything", Some(1))
            .await;
        assert!(context.is_empty());
    }
}
