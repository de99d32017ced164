//! Smriti Graph-Augmented Retrieval Engine
//!
//! Augments free-text document understanding with a queryable knowledge
//! graph and hybrid (vector + graph) retrieval for answer generation.
//!
//! # Architecture
//!
//! - Extraction: a language model turns text chunks into candidate
//!   entity/relationship graphs ([`extract`])
//! - Validation: candidate graphs are filtered against noise patterns
//!   before they reach storage ([`graph::validate`])
//! - Storage: a document-scoped property graph with idempotent merge
//!   semantics ([`graph::GraphStore`])
//! - GraphRAG: query entities are matched against the graph and their
//!   1-hop neighborhoods rendered as context ([`rag::GraphContextBuilder`])
//! - Vector retrieval: nearest-neighbor search over embedded passages
//!   ([`rag::VectorRetriever`])
//! - Generation: answers produced from the assembled context under bounded
//!   retries ([`rag::AnswerGenerator`])
//!
//! The completion and embedding models are pluggable external services;
//! [`engine::RetrievalEngine`] wires everything together for the outer
//! orchestration layer.
//!
//! # Example Usage
//!
//! ```rust
//! use smriti::graph::{validate, EdgeSpec, GraphPayload, GraphStore, NodeSpec};
//!
//! let payload = GraphPayload {
//!     nodes: vec![
//!         NodeSpec::new("Alice", "PERSON"),
//!         NodeSpec::new("Acme", "ORG"),
//!         NodeSpec::new("us-gaap:Revenue", "CONCEPT"),
//!     ],
//!     edges: vec![EdgeSpec::new("Alice", "Acme", "IS_CEO_OF")],
//! };
//!
//! // Taxonomy noise is filtered out before persistence
//! let validated = validate(payload);
//! assert_eq!(validated.nodes.len(), 2);
//!
//! let mut store = GraphStore::new();
//! let summary = store.upsert_graph(7, &validated);
//! assert_eq!(summary.nodes_merged, 2);
//! assert_eq!(summary.edges_merged, 1);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod rag;

// Re-export main types for convenience
pub use config::{CompletionConfig, EmbeddingConfig, LLMProvider};

pub use engine::{IngestReport, RetrievalEngine};

pub use extract::{Extraction, GraphExtractor};

pub use graph::{
    validate, DocumentGraph, DocumentId, EdgeSpec, Entity, GraphEdge, GraphNode, GraphPayload,
    GraphStore, NeighborTriple, NodeSpec, UpsertSummary,
};

pub use llm::{
    completion::HttpCompletionClient, embedding::HttpEmbeddingClient, ChatMessage,
    CompletionService, EmbeddingService, LlmError, LlmResult, ResponseMode,
};

pub use rag::{
    AnswerGenerator, GraphContextBuilder, Passage, PassageIndex, RagError, RagResult,
    VectorRetriever,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
