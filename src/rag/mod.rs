//! Hybrid retrieval and answer generation
//!
//! Combines vector-similarity retrieval over embedded passages with
//! knowledge-graph context assembly, and generates answers through the
//! completion service with bounded retries.

pub mod answer;
pub mod context;
pub mod passage;
pub mod retrieve;

use crate::llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RagError {
    #[error("Embedding service error: {0}")]
    Embedding(#[from] LlmError),
}

pub type RagResult<T> = Result<T, RagError>;

pub use answer::{AnswerGenerator, NO_ANSWER_PHRASE};
pub use context::{GraphContextBuilder, NEIGHBOR_LIMIT};
pub use passage::{Passage, PassageIndex};
pub use retrieve::{VectorRetriever, RETRIEVAL_LIMIT};
