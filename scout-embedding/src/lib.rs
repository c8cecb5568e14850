//! Embeddings and ephemeral similarity search for retrieved documents
//!
//! This crate turns document chunks into vector embeddings and answers
//! "which chunks are most relevant to this query" for a single research
//! stage.
//!
//! ## Features
//! - `Embedder` abstraction with an OpenAI-compatible implementation
//! - Cosine similarity and top-k ranking
//! - In-memory `VectorIndex` built per stage and never persisted
//! - Context retrieval that concatenates the best chunks for a prompt

pub mod client;
pub mod error;
pub mod index;
pub mod similarity;
pub mod types;

pub use client::EmbeddingClient;
pub use error::{EmbeddingError, Result};
pub use index::{retrieve_context, VectorIndex, DEFAULT_TOP_K};
pub use similarity::{cosine_similarity, find_similar};
pub use types::{Embedder, EmbeddingVector, ScoredChunk, SimilarityMatch};
