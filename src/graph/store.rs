//! In-memory document-scoped graph storage
//!
//! Entities are keyed by `(name, document_id)`: the same name is a distinct
//! entity per document, with no cross-document merging at write time. Edges
//! carry a uniform structural kind; the specific semantic relation is stored
//! as an edge property.
//!
//! Uses insertion-ordered maps so repeated reads render nodes and edges
//! deterministically.

use crate::graph::payload::GraphPayload;
use chrono::Utc;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Opaque document reference, minted by document-management logic outside
/// this crate.
pub type DocumentId = i64;

/// Structural kind shared by every stored edge
pub const EDGE_KIND: &str = "RELATED_TO";

/// A persisted entity, unique per `(name, document_id)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub entity_type: String,
    pub document_id: DocumentId,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// A persisted directed edge between two entities of the same document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct StoredEdge {
    /// Semantic relation property; rendering falls back to [`EDGE_KIND`]
    /// when absent
    relation: Option<String>,
    created_at: i64,
    updated_at: i64,
}

/// Merge counts for one `upsert_graph` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub nodes_merged: usize,
    pub edges_merged: usize,
    /// Edges skipped because an endpoint is absent in the document
    pub edges_skipped: usize,
}

/// Rendered node of a document graph read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// Rendered edge of a document graph read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

/// Full graph of one document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// One row of a 1-hop neighbor search: the matched entity, the connecting
/// relation, and the neighbor on the other end of the edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NeighborTriple {
    pub source: String,
    pub relation: String,
    pub target: String,
}

/// In-memory document-scoped property graph
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Per document: name -> entity, insertion-ordered
    entities: FxHashMap<DocumentId, IndexMap<String, Entity>>,

    /// Per document: (source name, target name) -> edge, insertion-ordered
    edges: FxHashMap<DocumentId, IndexMap<(String, String), StoredEdge>>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a validated payload into the document's graph.
    ///
    /// Node merges execute strictly before edge merges. Both merge kinds are
    /// idempotent: nodes are keyed by `(name, document_id)` with
    /// last-write-wins type, edges by `(source, target, document_id)` with
    /// last-write-wins relation. An edge whose endpoint does not exist in
    /// the document after the node pass is skipped silently.
    pub fn upsert_graph(
        &mut self,
        document_id: DocumentId,
        payload: &GraphPayload,
    ) -> UpsertSummary {
        let now = Utc::now().timestamp_millis();
        let mut summary = UpsertSummary::default();

        let doc_entities = self.entities.entry(document_id).or_default();
        for node in &payload.nodes {
            doc_entities
                .entry(node.id.clone())
                .and_modify(|entity| {
                    entity.entity_type = node.node_type.clone();
                    entity.updated_at = now;
                })
                .or_insert_with(|| Entity {
                    name: node.id.clone(),
                    entity_type: node.node_type.clone(),
                    document_id,
                    created_at: now,
                    updated_at: now,
                });
            summary.nodes_merged += 1;
        }

        let doc_edges = self.edges.entry(document_id).or_default();
        for edge in &payload.edges {
            if !doc_entities.contains_key(&edge.source)
                || !doc_entities.contains_key(&edge.target)
            {
                summary.edges_skipped += 1;
                continue;
            }
            doc_edges
                .entry((edge.source.clone(), edge.target.clone()))
                .and_modify(|stored| {
                    stored.relation = Some(edge.relation.clone());
                    stored.updated_at = now;
                })
                .or_insert_with(|| StoredEdge {
                    relation: Some(edge.relation.clone()),
                    created_at: now,
                    updated_at: now,
                });
            summary.edges_merged += 1;
        }

        summary
    }

    /// Read every entity of the document plus the relationships among them.
    ///
    /// Nodes are deduplicated by name (last write wins). The rendered
    /// relation prefers the semantic relation property and falls back to the
    /// structural kind.
    pub fn document_graph(&self, document_id: DocumentId) -> DocumentGraph {
        let mut nodes: IndexMap<String, GraphNode> = IndexMap::new();
        let mut edges = Vec::new();

        if let Some(doc_entities) = self.entities.get(&document_id) {
            for entity in doc_entities.values() {
                nodes.insert(
                    entity.name.clone(),
                    GraphNode {
                        id: entity.name.clone(),
                        label: entity.name.clone(),
                        node_type: entity.entity_type.clone(),
                    },
                );
            }
        }

        if let Some(doc_edges) = self.edges.get(&document_id) {
            for ((source, target), edge) in doc_edges {
                edges.push(GraphEdge {
                    source: source.clone(),
                    target: target.clone(),
                    relation: rendered_relation(edge),
                });
            }
        }

        DocumentGraph {
            nodes: nodes.into_values().collect(),
            edges,
        }
    }

    /// 1-hop neighbor search for GraphRAG context assembly.
    ///
    /// Entity names match by case-insensitive substring containment against
    /// stored names, a deliberate recall-over-precision choice: model-
    /// extracted query entities rarely match stored casing or surface form
    /// exactly. Traversal is undirected; the returned rows are capped at
    /// `limit`. With no `document_id` the search spans all documents.
    pub fn find_neighbors(
        &self,
        entity_names: &[String],
        document_id: Option<DocumentId>,
        limit: usize,
    ) -> Vec<NeighborTriple> {
        let needles: Vec<String> = entity_names
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        if needles.is_empty() {
            return Vec::new();
        }

        let scope: Vec<DocumentId> = match document_id {
            Some(id) => vec![id],
            None => {
                let mut ids: Vec<DocumentId> = self.entities.keys().copied().collect();
                ids.sort_unstable();
                ids
            }
        };

        let mut rows = Vec::new();
        for doc in scope {
            let Some(doc_entities) = self.entities.get(&doc) else {
                continue;
            };

            let matched: FxHashSet<&str> = doc_entities
                .keys()
                .filter(|name| {
                    let lowered = name.to_lowercase();
                    needles.iter().any(|needle| lowered.contains(needle.as_str()))
                })
                .map(|name| name.as_str())
                .collect();
            if matched.is_empty() {
                continue;
            }

            let Some(doc_edges) = self.edges.get(&doc) else {
                continue;
            };
            for ((source, target), edge) in doc_edges {
                let relation = rendered_relation(edge);
                if matched.contains(source.as_str()) {
                    if rows.len() >= limit {
                        return rows;
                    }
                    rows.push(NeighborTriple {
                        source: source.clone(),
                        relation: relation.clone(),
                        target: target.clone(),
                    });
                }
                if matched.contains(target.as_str()) && source != target {
                    if rows.len() >= limit {
                        return rows;
                    }
                    rows.push(NeighborTriple {
                        source: target.clone(),
                        relation,
                        target: source.clone(),
                    });
                }
            }
        }

        rows
    }

    /// Detach-delete every entity scoped to the document.
    ///
    /// Incident relationships are removed in the same operation so no orphan
    /// edges remain. Returns the number of removed entities.
    pub fn delete_document_graph(&mut self, document_id: DocumentId) -> usize {
        let removed = self
            .entities
            .remove(&document_id)
            .map(|entities| entities.len())
            .unwrap_or(0);
        self.edges.remove(&document_id);
        removed
    }

    /// Look up one entity by name within a document
    pub fn entity(&self, document_id: DocumentId, name: &str) -> Option<&Entity> {
        self.entities.get(&document_id)?.get(name)
    }

    /// Total entity count across all documents
    pub fn node_count(&self) -> usize {
        self.entities.values().map(IndexMap::len).sum()
    }

    /// Total edge count across all documents
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

fn rendered_relation(edge: &StoredEdge) -> String {
    edge.relation
        .clone()
        .unwrap_or_else(|| EDGE_KIND.to_string())
}
