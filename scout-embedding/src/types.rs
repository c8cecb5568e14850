//! Core types for embeddings

use async_trait::async_trait;
use scout_core::Chunk;
use serde::Serialize;

use crate::error::Result;

/// Embedding vector (1536 dimensions for text-embedding-3-small)
pub type EmbeddingVector = Vec<f32>;

/// Anything that can turn text into embedding vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, one vector per input in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector>;
}

/// Similarity match result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityMatch {
    /// Position of the candidate in the searched slice
    pub index: usize,
    /// Cosine similarity score (-1.0 - 1.0)
    pub score: f64,
}

/// A chunk returned from an index lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}
