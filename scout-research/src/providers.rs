//! Outbound collaborator traits
//!
//! The pipeline only talks to the outside world through these traits (plus
//! [`scout_embedding::Embedder`]), so every provider can be swapped for a
//! test double.

use async_trait::async_trait;
use scout_core::{Chunk, ScoutResult, SearchDepth, SearchResult};

/// Web search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ordered results for `query`, best first
    async fn search(&self, query: &str, depth: SearchDepth) -> ScoutResult<Vec<SearchResult>>;
}

/// Fetches a document and splits it into chunks
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &str) -> ScoutResult<Vec<Chunk>>;
}

/// Chat-style text completion
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Raw text of the model's answer
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ScoutResult<String>;
}
