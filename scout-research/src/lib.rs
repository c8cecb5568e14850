//! Company Research Agent
//!
//! This crate researches a company across six analytical domains and its
//! competitor landscape. Each stage runs search -> fetch/chunk -> embed/index
//! -> retrieve -> structured extraction, using Tavily for search and an
//! OpenAI-compatible model for embeddings and extraction.

pub mod extractor;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod providers;
pub mod snapshot;
pub mod splitter;
pub mod state;
pub mod tavily;
pub mod testing;

pub use extractor::StructuredExtractor;
pub use llm::OpenAIClient;
pub use loader::WebDocumentLoader;
pub use pipeline::{PipelineSettings, ResearchAgent};
pub use providers::{DocumentLoader, LanguageModel, SearchProvider};
pub use scout_embedding::{Embedder, EmbeddingClient};
pub use snapshot::{to_yaml, write_snapshot, DEFAULT_SNAPSHOT_PATH};
pub use splitter::{TextSplitter, CHUNK_OVERLAP, CHUNK_SIZE};
pub use state::{format_results, EmptyReason, ResearchState, StageKey, StageOutcome, StageValue};
pub use tavily::TavilyClient;
