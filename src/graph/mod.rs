//! Knowledge graph core
//!
//! This module implements the document-scoped property graph:
//! - Candidate graph payloads as extracted by the language model
//! - Validation/filtering of candidate nodes and edges against noise patterns
//! - In-memory storage with idempotent merge semantics keyed by
//!   `(name, document_id)`

pub mod payload;
pub mod store;
pub mod validate;

// Re-export main types
pub use payload::{EdgeSpec, GraphPayload, NodeSpec};
pub use store::{
    DocumentGraph, DocumentId, Entity, GraphEdge, GraphNode, GraphStore, NeighborTriple,
    UpsertSummary, EDGE_KIND,
};
pub use validate::validate;
