use async_trait::async_trait;
use reqwest::Client;
use scout_core::{ScoutError, ScoutResult, SearchDepth, SearchResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::providers::SearchProvider;

const TAVILY_API_BASE: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
}

#[derive(Debug, Serialize)]
pub struct TavilySearchRequest {
    pub api_key: String,
    pub query: String,
    pub search_depth: SearchDepth,
}

#[derive(Debug, Deserialize)]
pub struct TavilySearchResponse {
    #[serde(default)]
    pub results: Vec<TavilySearchResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TavilySearchResult {
    #[serde(default)]
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    pub score: Option<f64>,
}

impl From<TavilySearchResult> for SearchResult {
    fn from(result: TavilySearchResult) -> Self {
        SearchResult {
            url: result.url.filter(|u| !u.trim().is_empty()),
            title: result.title,
            content: result.content,
            score: result.score,
        }
    }
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ScoutError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ScoutError::config("TAVILY_API_KEY must not be empty"));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ScoutError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, api_key })
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn search_raw(
        &self,
        request: &TavilySearchRequest,
    ) -> Result<TavilySearchResponse, ScoutError> {
        let url = format!("{}/search", TAVILY_API_BASE);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ScoutError::network(format!("Tavily API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::api(format!("Tavily API error ({}): {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| ScoutError::parse(format!("Failed to parse Tavily response: {}", e)))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, depth: SearchDepth) -> ScoutResult<Vec<SearchResult>> {
        let request = TavilySearchRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            search_depth: depth,
        };

        let response = self.search_raw(&request).await?;
        debug!(
            "Tavily returned {} results for {:?} ({} depth)",
            response.results.len(),
            query,
            depth.as_str()
        );

        Ok(response.results.into_iter().map(SearchResult::from).collect())
    }
}
