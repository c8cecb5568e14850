//! Search and document primitives shared by the providers

use serde::{Deserialize, Serialize};

/// How much effort the search provider should spend on a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// A single hit returned by the search provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: Option<String>,
    pub title: Option<String>,
    /// Snippet or extracted content for the hit
    #[serde(default)]
    pub content: String,
    pub score: Option<f64>,
}

impl SearchResult {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Bounded text segment of a fetched document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// URL the text was loaded from
    pub source: String,
    /// Position of this chunk within its source document
    pub position: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(source: impl Into<String>, position: usize, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            position,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
