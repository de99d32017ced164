//! Passage storage and nearest-neighbor search
//!
//! Passages are immutable after ingestion and scoped to their owning
//! document; search is an exact scan ordered by L2 distance. Per-document
//! passage counts are small enough that an approximate index would cost
//! more than it saves.

use crate::graph::DocumentId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A segment of a document's text paired with its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    pub text: String,
    pub embedding: Vec<f32>,
    pub document_id: DocumentId,
}

/// In-memory store of embedded passages, scoped per document
#[derive(Debug, Default)]
pub struct PassageIndex {
    passages: FxHashMap<DocumentId, Vec<Passage>>,
}

impl PassageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, passage: Passage) {
        self.passages
            .entry(passage.document_id)
            .or_default()
            .push(passage);
    }

    /// The `k` passages of the document nearest to the query embedding,
    /// ordered by ascending L2 distance. No distance threshold: weak
    /// matches are returned rather than filtered.
    pub fn nearest(&self, document_id: DocumentId, query: &[f32], k: usize) -> Vec<Passage> {
        let Some(passages) = self.passages.get(&document_id) else {
            return Vec::new();
        };

        let mut scored: Vec<(f32, &Passage)> = passages
            .iter()
            .map(|passage| (l2_distance(&passage.embedding, query), passage))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .take(k)
            .map(|(_, passage)| passage.clone())
            .collect()
    }

    /// Drop every passage of the document; returns the removed count
    pub fn delete_document(&mut self, document_id: DocumentId) -> usize {
        self.passages
            .remove(&document_id)
            .map(|passages| passages.len())
            .unwrap_or(0)
    }

    pub fn document_len(&self, document_id: DocumentId) -> usize {
        self.passages
            .get(&document_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.passages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Euclidean distance between two embeddings
pub(crate) fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        sum += d * d;
    }
    sum.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(document_id: DocumentId, text: &str, embedding: Vec<f32>) -> Passage {
        Passage {
            text: text.to_string(),
            embedding,
            document_id,
        }
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let mut index = PassageIndex::new();
        index.add(passage(1, "far", vec![10.0, 0.0]));
        index.add(passage(1, "near", vec![1.0, 0.0]));
        index.add(passage(1, "mid", vec![5.0, 0.0]));

        let results = index.nearest(1, &[0.0, 0.0], 5);
        let texts: Vec<&str> = results.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_nearest_caps_at_k() {
        let mut index = PassageIndex::new();
        for i in 0..8 {
            index.add(passage(1, &format!("p{i}"), vec![i as f32]));
        }

        let results = index.nearest(1, &[0.0], 5);
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            let d0 = l2_distance(&pair[0].embedding, &[0.0]);
            let d1 = l2_distance(&pair[1].embedding, &[0.0]);
            assert!(d0 <= d1);
        }
    }

    #[test]
    fn test_nearest_is_document_scoped() {
        let mut index = PassageIndex::new();
        index.add(passage(1, "doc1", vec![0.0]));
        index.add(passage(2, "doc2", vec![0.0]));

        let results = index.nearest(1, &[0.0], 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "doc1");
    }

    #[test]
    fn test_delete_document_drops_passages() {
        let mut index = PassageIndex::new();
        index.add(passage(1, "a", vec![0.0]));
        index.add(passage(1, "b", vec![1.0]));
        index.add(passage(2, "c", vec![2.0]));

        assert_eq!(index.delete_document(1), 2);
        assert!(index.nearest(1, &[0.0], 5).is_empty());
        assert_eq!(index.document_len(2), 1);
    }
}
