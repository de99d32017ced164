//! Candidate graph validation
//!
//! Model extraction over tagged source documents leaks taxonomy artifacts
//! (XBRL-style qualifiers, templated member/domain/table suffixes) alongside
//! real entities. This filter drops those before they reach storage.

use crate::graph::payload::{GraphPayload, NodeSpec};
use rustc_hash::FxHashSet;

/// Tag-like fragments that mark a node id as taxonomy noise
const EXCLUDED_ID_FRAGMENTS: &[&str] = &["us-gaap", "srt:", "nvda:", "Member", "Domain", "Table"];

/// Type labels for date/time-period categories
const DATE_TYPE_LABELS: &[&str] = &["DATE", "TIMEPERIOD"];

/// Minimum node id length
const MIN_ID_LEN: usize = 2;

/// Filter a candidate payload down to valid nodes and edges.
///
/// Pure and deterministic. An edge survives only if both endpoints survive;
/// edges referencing rejected or unknown nodes are dropped with no error
/// raised. Callers must skip persistence entirely when the result is empty.
pub fn validate(payload: GraphPayload) -> GraphPayload {
    let mut nodes = Vec::with_capacity(payload.nodes.len());
    let mut valid_ids: FxHashSet<String> = FxHashSet::default();

    for node in payload.nodes {
        if !node_is_valid(&node) {
            continue;
        }
        valid_ids.insert(node.id.clone());
        nodes.push(node);
    }

    let edges = payload
        .edges
        .into_iter()
        .filter(|edge| valid_ids.contains(&edge.source) && valid_ids.contains(&edge.target))
        .collect();

    GraphPayload { nodes, edges }
}

fn node_is_valid(node: &NodeSpec) -> bool {
    // Namespaced taxonomy tags carry a colon qualifier
    if node.id.contains(':') {
        return false;
    }
    if DATE_TYPE_LABELS.contains(&node.node_type.as_str()) {
        return false;
    }
    if EXCLUDED_ID_FRAGMENTS
        .iter()
        .any(|fragment| node.id.contains(fragment))
    {
        return false;
    }
    if node.id.chars().count() < MIN_ID_LEN {
        return false;
    }
    true
}
