//! Error types for embedding operations

use scout_core::ScoutError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

impl From<EmbeddingError> for ScoutError {
    fn from(err: EmbeddingError) -> Self {
        ScoutError::embedding(err.to_string())
    }
}
