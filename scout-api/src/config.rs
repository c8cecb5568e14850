//! Server configuration from environment variables

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use scout_core::{ScoutError, ScoutResult};
use scout_research::DEFAULT_SNAPSHOT_PATH;

const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 3001;

/// Everything the server needs to build its providers
#[derive(Clone)]
pub struct AppConfig {
    pub tavily_api_key: String,
    pub openai_api_key: String,
    /// OpenAI-compatible base URL for chat completions (e.g. Groq)
    pub llm_api_base: Option<String>,
    pub llm_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub call_timeout: Duration,
    /// `None` disables the snapshot file
    pub snapshot_path: Option<PathBuf>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> ScoutResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> ScoutResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| ScoutError::config(format!("{} must be set", key)))
        };

        let tavily_api_key = require("TAVILY_API_KEY")?;
        let openai_api_key = require("OPENAI_API_KEY")?;

        let embedding_model =
            get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let embedding_dimension = match get("EMBEDDING_DIMENSION") {
            Some(raw) => parse_number("EMBEDDING_DIMENSION", &raw)?,
            None => known_dimension(&embedding_model).ok_or_else(|| {
                ScoutError::config(format!(
                    "EMBEDDING_DIMENSION must be set for embedding model {}",
                    embedding_model
                ))
            })?,
        };

        let call_timeout_secs = match get("CALL_TIMEOUT_SECS") {
            Some(raw) => parse_number("CALL_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_CALL_TIMEOUT_SECS,
        };
        if call_timeout_secs == 0 {
            return Err(ScoutError::config("CALL_TIMEOUT_SECS must be positive"));
        }

        // Set-but-empty disables the snapshot, unset uses the default
        let snapshot_path = match lookup("SNAPSHOT_PATH") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(PathBuf::from(raw.trim())),
            None => Some(PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
        };

        let port = match get("SERVER_PORT") {
            Some(raw) => parse_number("SERVER_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            tavily_api_key,
            openai_api_key,
            llm_api_base: get("LLM_API_BASE"),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            embedding_model,
            embedding_dimension,
            call_timeout: Duration::from_secs(call_timeout_secs),
            snapshot_path,
            port,
        })
    }
}

// Keys stay out of logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("llm_api_base", &self.llm_api_base)
            .field("llm_model", &self.llm_model)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dimension", &self.embedding_dimension)
            .field("call_timeout", &self.call_timeout)
            .field("snapshot_path", &self.snapshot_path)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

fn known_dimension(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> ScoutResult<T> {
    raw.parse()
        .map_err(|_| ScoutError::config(format!("{} is not a valid number: {}", key, raw)))
}
