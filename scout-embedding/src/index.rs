//! Ephemeral in-memory vector index
//!
//! One index is built per research stage from that stage's chunks, queried
//! once and dropped. Nothing is persisted or shared between stages.

use scout_core::Chunk;
use tracing::{debug, instrument};

use crate::{
    error::{EmbeddingError, Result},
    similarity::find_similar,
    types::{Embedder, EmbeddingVector, ScoredChunk},
};

/// Number of chunks concatenated into a retrieval context
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: EmbeddingVector,
}

/// Similarity index over the embeddings of one stage's chunks
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed `chunks` and index them
    ///
    /// Returns `Ok(None)` for an empty chunk set without calling the embedder.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn build(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> Result<Option<Self>> {
        if chunks.is_empty() {
            debug!("No chunks to index");
            return Ok(None);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_documents(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or_default();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(EmbeddingError::InvalidDimension {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect::<Vec<_>>();

        debug!("Built vector index: {} entries, dimension={}", entries.len(), dimension);

        Ok(Some(Self { entries, dimension }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` chunks nearest to `query`, most similar first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let matches = find_similar(
            query,
            self.entries.iter().map(|e| e.embedding.as_slice()),
            k,
        );

        Ok(matches
            .into_iter()
            .map(|m| ScoredChunk {
                chunk: self.entries[m.index].chunk.clone(),
                score: m.score,
            })
            .collect())
    }
}

/// Retrieve the `k` most relevant chunks for `query`, joined with newlines
///
/// A missing index yields an empty context rather than an error.
#[instrument(skip(embedder, index))]
pub async fn retrieve_context(
    embedder: &dyn Embedder,
    index: Option<&VectorIndex>,
    query: &str,
    k: usize,
) -> Result<String> {
    let Some(index) = index else {
        debug!("No vector index, returning empty context");
        return Ok(String::new());
    };

    let query_embedding = embedder.embed_query(query).await?;
    let hits = index.search(&query_embedding, k)?;

    Ok(hits
        .iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text by keyword presence so rankings are predictable
    struct KeywordEmbedder {
        calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn vector(text: &str) -> EmbeddingVector {
            let text = text.to_lowercase();
            ["revenue", "lawsuit", "voters"]
                .iter()
                .map(|kw| if text.contains(kw) { 1.0 } else { 0.1 })
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        async fn embed_query(&self, text: &str) -> Result<EmbeddingVector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector(text))
        }
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("https://a.example", 0, "A lawsuit was filed"),
            Chunk::new("https://a.example", 1, "Quarterly revenue grew"),
            Chunk::new("https://b.example", 0, "Voters in the region"),
            Chunk::new("https://b.example", 1, "Revenue and lawsuit exposure"),
        ]
    }

    #[tokio::test]
    async fn test_empty_chunks_build_no_index() {
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::build(&embedder, Vec::new()).await.unwrap();
        assert!(index.is_none());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retrieve_ranks_most_similar_first() {
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::build(&embedder, chunks()).await.unwrap().unwrap();
        assert_eq!(index.len(), 4);

        let context = retrieve_context(&embedder, Some(&index), "revenue", 2)
            .await
            .unwrap();
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines, vec!["Quarterly revenue grew", "Revenue and lawsuit exposure"]);
    }

    #[tokio::test]
    async fn test_retrieve_without_index_is_empty() {
        let embedder = KeywordEmbedder::new();
        let context = retrieve_context(&embedder, None, "revenue", DEFAULT_TOP_K)
            .await
            .unwrap();
        assert!(context.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_query_dimension() {
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::build(&embedder, chunks()).await.unwrap().unwrap();
        let err = index.search(&[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::InvalidDimension { expected: 3, actual: 2 }
        ));
    }
}
