//! Vector-similarity retrieval over embedded passages

use crate::graph::DocumentId;
use crate::llm::EmbeddingService;
use crate::rag::passage::{Passage, PassageIndex};
use crate::rag::RagResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Maximum passages returned per query
pub const RETRIEVAL_LIMIT: usize = 5;

/// Embeds queries and text chunks with the same embedding service so the
/// vector space matches across ingestion and query paths.
pub struct VectorRetriever {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<RwLock<PassageIndex>>,
}

impl VectorRetriever {
    pub fn new(embedding: Arc<dyn EmbeddingService>, index: Arc<RwLock<PassageIndex>>) -> Self {
        Self { embedding, index }
    }

    /// Embed text chunks and append them to the document's passages.
    /// Returns the number of passages stored.
    pub async fn index_chunks(
        &self,
        document_id: DocumentId,
        chunks: &[String],
    ) -> RagResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedding.embed(chunks).await?;

        let mut index = self.index.write().await;
        let mut stored = 0;
        for (text, embedding) in chunks.iter().zip(embeddings) {
            index.add(Passage {
                text: text.clone(),
                embedding,
                document_id,
            });
            stored += 1;
        }
        debug!("Indexed {stored} passages for document {document_id}");
        Ok(stored)
    }

    /// The passages of the document nearest to the query, at most
    /// [`RETRIEVAL_LIMIT`], ordered by ascending distance.
    pub async fn retrieve(
        &self,
        document_id: DocumentId,
        query_text: &str,
    ) -> RagResult<Vec<Passage>> {
        debug!("Embedding query for document {document_id}");
        let query = self.embedding.embed_one(query_text).await?;

        let index = self.index.read().await;
        Ok(index.nearest(document_id, &query, RETRIEVAL_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, LlmResult};
    use async_trait::async_trait;

    /// Maps known texts onto fixed points of a 1-dimensional space
    struct StubEmbedding;

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|text| match text.as_str() {
                    "query" => Ok(vec![0.0]),
                    "near" => Ok(vec![1.0]),
                    "mid" => Ok(vec![5.0]),
                    "far" => Ok(vec![10.0]),
                    other => Err(LlmError::Api(format!("unknown text: {other}"))),
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_index_then_retrieve_ordered() {
        let index = Arc::new(RwLock::new(PassageIndex::new()));
        let retriever = VectorRetriever::new(Arc::new(StubEmbedding), index);

        let chunks = vec!["far".to_string(), "near".to_string(), "mid".to_string()];
        let stored = retriever.index_chunks(7, &chunks).await.unwrap();
        assert_eq!(stored, 3);

        let passages = retriever.retrieve(7, "query").await.unwrap();
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let index = Arc::new(RwLock::new(PassageIndex::new()));
        let retriever = VectorRetriever::new(Arc::new(StubEmbedding), index);

        let result = retriever.retrieve(7, "no such text").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_chunks_are_noop() {
        let index = Arc::new(RwLock::new(PassageIndex::new()));
        let retriever = VectorRetriever::new(Arc::new(StubEmbedding), index.clone());

        assert_eq!(retriever.index_chunks(7, &[]).await.unwrap(), 0);
        assert!(index.read().await.is_empty());
    }
}
