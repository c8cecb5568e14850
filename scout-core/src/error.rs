//! Error types for the research agent

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    #[error("Research run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    pub fn missing_input(msg: impl Into<String>) -> Self {
        ScoutError::MissingInput(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ScoutError::InvalidInput(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        ScoutError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ScoutError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ScoutError::Parse(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        ScoutError::Embedding(msg.into())
    }

    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        ScoutError::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ScoutError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ScoutError::Internal(msg.into())
    }

    /// Whether this error comes from an external dependency (search, fetch,
    /// embedding, LLM) rather than from the caller or the agent itself.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            ScoutError::Api(_)
                | ScoutError::Network(_)
                | ScoutError::Parse(_)
                | ScoutError::Embedding(_)
                | ScoutError::Timeout { .. }
        )
    }
}

/// Result type alias for research operations
pub type ScoutResult<T> = Result<T, ScoutError>;
