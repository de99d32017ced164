//! Candidate graph payloads produced by model extraction
//!
//! These are the unvalidated shapes decoded straight from the model's JSON
//! output. All fields carry serde defaults so a partial payload still parses.

use serde::{Deserialize, Serialize};

/// A candidate entity emitted by the extraction model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeSpec {
    /// Entity name; becomes the node's identity within its document
    pub id: String,

    /// Category label (e.g., "PERSON", "ORG")
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

/// A candidate directed relationship between two entities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    /// Free-text semantic label (e.g., "IS_CEO_OF")
    #[serde(default)]
    pub relation: String,
}

impl EdgeSpec {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }
}

/// The candidate graph for one text chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

impl GraphPayload {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

fn default_node_type() -> String {
    "Unknown".to_string()
}
