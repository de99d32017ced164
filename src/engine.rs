//! Engine facade wiring extraction, storage, and retrieval together
//!
//! Owns the graph store and passage index behind per-operation locks and
//! holds the injected completion/embedding clients. The outer orchestration
//! layer (web routing, uploads, chunk splitting) lives outside this crate
//! and talks to the engine through these methods.

use crate::extract::GraphExtractor;
use crate::graph::{
    validate, DocumentGraph, DocumentId, GraphStore, NeighborTriple,
};
use crate::llm::{CompletionService, EmbeddingService};
use crate::rag::context::NEIGHBOR_LIMIT;
use crate::rag::{AnswerGenerator, GraphContextBuilder, PassageIndex, RagResult, VectorRetriever};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// What one `ingest_chunk` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub passages_indexed: usize,
    pub nodes_stored: usize,
    pub edges_stored: usize,
    /// True when graph extraction failed and the chunk was stored without
    /// graph augmentation
    pub extraction_degraded: bool,
}

pub struct RetrievalEngine {
    extractor: GraphExtractor,
    context_builder: GraphContextBuilder,
    retriever: VectorRetriever,
    generator: AnswerGenerator,
    graph: Arc<RwLock<GraphStore>>,
    passages: Arc<RwLock<PassageIndex>>,
}

impl RetrievalEngine {
    /// Wire up the engine around process-scoped service clients. The clients
    /// are injected rather than constructed here so callers initialize them
    /// once at startup and share them across engines and requests.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        embedding: Arc<dyn EmbeddingService>,
    ) -> Self {
        let graph = Arc::new(RwLock::new(GraphStore::new()));
        let passages = Arc::new(RwLock::new(PassageIndex::new()));

        Self {
            extractor: GraphExtractor::new(completion.clone()),
            context_builder: GraphContextBuilder::new(completion.clone(), graph.clone()),
            retriever: VectorRetriever::new(embedding, passages.clone()),
            generator: AnswerGenerator::new(completion),
            graph,
            passages,
        }
    }

    /// Ingest one text chunk of a document: embed and index it as a passage,
    /// then extract, validate, and persist its knowledge graph.
    ///
    /// Graph extraction failure is invisible to the end user: the chunk is
    /// still stored and retrievable, just without graph augmentation. An
    /// embedding failure propagates, since without it nothing was stored.
    pub async fn ingest_chunk(
        &self,
        document_id: DocumentId,
        text: &str,
    ) -> RagResult<IngestReport> {
        let chunks = [text.to_string()];
        let passages_indexed = self.retriever.index_chunks(document_id, &chunks).await?;

        let extraction = self.extractor.extract(text).await;
        let extraction_degraded = extraction.is_degraded();
        let validated = validate(extraction.into_payload());

        let mut report = IngestReport {
            passages_indexed,
            extraction_degraded,
            ..IngestReport::default()
        };

        // An empty validated payload skips persistence entirely
        if !validated.is_empty() {
            let summary = self.graph.write().await.upsert_graph(document_id, &validated);
            info!(
                "Stored {} nodes and {} edges for document {document_id}",
                summary.nodes_merged, summary.edges_merged
            );
            report.nodes_stored = summary.nodes_merged;
            report.edges_stored = summary.edges_merged;
        }

        Ok(report)
    }

    /// Answer a query from graph context and, when a document scope is
    /// given, vector-retrieved passages. Always returns a string; retrieval
    /// failures degrade to generating from whatever context remains.
    pub async fn answer(&self, document_id: Option<DocumentId>, query: &str) -> String {
        let graph_context = self.context_builder.build(query, document_id).await;

        let passages = match document_id {
            Some(doc) => match self.retriever.retrieve(doc, query).await {
                Ok(passages) => passages,
                Err(err) => {
                    error!("Passage retrieval failed for document {doc}: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        self.generator.generate(query, &passages, &graph_context).await
    }

    /// Full graph of one document, for the outer visualization layer
    pub async fn document_graph(&self, document_id: DocumentId) -> DocumentGraph {
        self.graph.read().await.document_graph(document_id)
    }

    /// 1-hop neighbor search across the stored graph
    pub async fn find_neighbors(
        &self,
        entity_names: &[String],
        document_id: Option<DocumentId>,
    ) -> Vec<NeighborTriple> {
        self.graph
            .read()
            .await
            .find_neighbors(entity_names, document_id, NEIGHBOR_LIMIT)
    }

    /// Best-effort cascade delete of a document's graph and passages.
    /// Deletion is cleanup, not a hard dependency of the calling workflow,
    /// so this never errors.
    pub async fn delete_document(&self, document_id: DocumentId) {
        let removed = self.graph.write().await.delete_document_graph(document_id);
        info!("Deleted {removed} graph nodes for document {document_id}");

        let dropped = self.passages.write().await.delete_document(document_id);
        info!("Dropped {dropped} passages for document {document_id}");
    }

    /// Explicit teardown hook, the counterpart of constructing the engine at
    /// startup. Shared service clients outlive the engine and are released
    /// by their owner.
    pub async fn shutdown(self) {
        let nodes = self.graph.read().await.node_count();
        let passages = self.passages.read().await.len();
        info!("Retrieval engine shutting down ({nodes} nodes, {passages} passages in memory)");
    }
}
