//! Test doubles for the pipeline's providers
//!
//! Each mock records the calls it receives so tests can assert on call
//! counts as well as on results. Replies are chosen by the first rule whose
//! pattern is a substring of the query, URL or prompt.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scout_core::{Chunk, ScoutError, ScoutResult, SearchDepth, SearchResult};
use scout_embedding::{Embedder, EmbeddingError, EmbeddingVector};

use crate::providers::{DocumentLoader, LanguageModel, SearchProvider};
use crate::splitter::TextSplitter;

// =============================================================================
// Mock Search Provider
// =============================================================================

#[derive(Debug, Clone)]
enum SearchReply {
    Results(Vec<SearchResult>),
    Fail,
    Slow(Duration),
}

#[derive(Default)]
pub struct MockSearchProvider {
    rules: Mutex<Vec<(String, SearchReply)>>,
    calls: Mutex<Vec<String>>,
}

impl MockSearchProvider {
    /// Returns no results for every query until rules are added
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, pattern: &str, results: Vec<SearchResult>) -> Self {
        self.rules
            .lock()
            .push((pattern.to_string(), SearchReply::Results(results)));
        self
    }

    /// Results that each carry one of `urls`
    pub fn with_urls(self, pattern: &str, urls: &[&str]) -> Self {
        let results = urls.iter().map(|u| SearchResult::with_url(*u)).collect();
        self.with_results(pattern, results)
    }

    pub fn failing_on(self, pattern: &str) -> Self {
        self.rules.lock().push((pattern.to_string(), SearchReply::Fail));
        self
    }

    /// Sleep for `delay` before answering with no results
    pub fn slow_on(self, pattern: &str, delay: Duration) -> Self {
        self.rules
            .lock()
            .push((pattern.to_string(), SearchReply::Slow(delay)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_searched(&self, query: &str) -> bool {
        self.calls.lock().iter().any(|q| q == query)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, _depth: SearchDepth) -> ScoutResult<Vec<SearchResult>> {
        self.calls.lock().push(query.to_string());

        let reply = self
            .rules
            .lock()
            .iter()
            .find(|(pattern, _)| query.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(SearchReply::Results(results)) => Ok(results),
            Some(SearchReply::Fail) => Err(ScoutError::api("mock search failure")),
            Some(SearchReply::Slow(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Mock Document Loader
// =============================================================================

pub struct MockDocumentLoader {
    pages: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    splitter: TextSplitter,
}

impl Default for MockDocumentLoader {
    fn default() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            splitter: TextSplitter::default(),
        }
    }
}

impl MockDocumentLoader {
    /// Unknown URLs load as "Content from {url}"
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.pages.lock().insert(url.to_string(), text.to_string());
        self
    }

    pub fn failing_on(self, url: &str) -> Self {
        self.failing.lock().insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl DocumentLoader for MockDocumentLoader {
    async fn load(&self, url: &str) -> ScoutResult<Vec<Chunk>> {
        self.calls.lock().push(url.to_string());

        if self.failing.lock().contains(url) {
            return Err(ScoutError::network(format!("mock fetch failure for {}", url)));
        }

        let text = self
            .pages
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("Content from {}", url));

        Ok(self.splitter.split_into_chunks(url, &text))
    }
}

// =============================================================================
// Mock Embedder
// =============================================================================

const MOCK_DIMENSION: usize = 16;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
#[derive(Default)]
pub struct MockEmbedder {
    document_calls: Mutex<usize>,
    query_calls: Mutex<usize>,
    failing: bool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a provider error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn document_calls(&self) -> usize {
        *self.document_calls.lock()
    }

    pub fn query_calls(&self) -> usize {
        *self.query_calls.lock()
    }

    pub fn call_count(&self) -> usize {
        self.document_calls() + self.query_calls()
    }

    pub fn vector(text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0f32; MOCK_DIMENSION];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |hash, b| (hash ^ b as u32).wrapping_mul(16777619));
            vector[bucket as usize % MOCK_DIMENSION] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(
        &self,
        texts: &[String],
    ) -> scout_embedding::Result<Vec<EmbeddingVector>> {
        *self.document_calls.lock() += 1;
        if self.failing {
            return Err(EmbeddingError::Provider("mock embedding failure".to_string()));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> scout_embedding::Result<EmbeddingVector> {
        *self.query_calls.lock() += 1;
        if self.failing {
            return Err(EmbeddingError::Provider("mock embedding failure".to_string()));
        }
        Ok(Self::vector(text))
    }
}

// =============================================================================
// Mock Language Model
// =============================================================================

#[derive(Debug, Clone)]
enum LlmReply {
    Answer(String),
    Fail,
}

pub struct MockLanguageModel {
    rules: Mutex<Vec<(String, LlmReply)>>,
    default_answer: Mutex<String>,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            default_answer: Mutex::new("{}".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl MockLanguageModel {
    /// Answers `{}` to every prompt until rules are added
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, pattern: &str, answer: &str) -> Self {
        self.rules
            .lock()
            .push((pattern.to_string(), LlmReply::Answer(answer.to_string())));
        self
    }

    pub fn with_default_answer(self, answer: &str) -> Self {
        *self.default_answer.lock() = answer.to_string();
        self
    }

    pub fn failing_on(self, pattern: &str) -> Self {
        self.rules.lock().push((pattern.to_string(), LlmReply::Fail));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> ScoutResult<String> {
        self.prompts.lock().push(user_prompt.to_string());

        let reply = self
            .rules
            .lock()
            .iter()
            .find(|(pattern, _)| user_prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(LlmReply::Answer(answer)) => Ok(answer),
            Some(LlmReply::Fail) => Err(ScoutError::api("mock LLM failure")),
            None => Ok(self.default_answer.lock().clone()),
        }
    }
}
