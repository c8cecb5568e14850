//! Company research endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use scout_core::{CompanyResearch, DomainKey, ScoutError};
use scout_research::{to_yaml, write_snapshot};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::error_response;
use crate::AppState;

const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Create research routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/agent/summary", get(summarize))
        .route("/agent", get(research))
}

#[derive(Debug, Deserialize)]
struct AgentQuery {
    company: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|f| f.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("yaml") | Some("yml") => Some(OutputFormat::Yaml),
            Some("json") => Some(OutputFormat::Json),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    company: Option<String>,
    domain: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    company_name: String,
    domain: DomainKey,
    summary: String,
}

/// Run the full research pipeline for one company
async fn research(State(state): State<AppState>, Query(query): Query<AgentQuery>) -> Response {
    let Some(company) = required_company(query.company.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, "Company name is required");
    };

    let Some(format) = OutputFormat::parse(query.format.as_deref()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown format: {}", query.format.unwrap_or_default()),
        );
    };

    info!("Research requested for {}", company);

    let report = match state
        .agent
        .run_with_cancel(company, state.shutdown.child_token())
        .await
    {
        Ok(report) => report,
        Err(e) => return scout_error_response(e),
    };

    if let Some(path) = &state.snapshot_path {
        match write_snapshot(&report, path).await {
            Ok(()) => info!("Results saved to {}", path.display()),
            Err(e) => warn!("Failed to write snapshot to {}: {}", path.display(), e),
        }
    }

    render(&report, format)
}

/// Markdown summary for one domain of a company
async fn summarize(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let Some(company) = required_company(query.company.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, "Company name is required");
    };

    let domain: DomainKey = match query.domain.as_deref().map(str::parse::<DomainKey>) {
        Some(Ok(domain)) => domain,
        Some(Err(e)) => return scout_error_response(e),
        None => return error_response(StatusCode::BAD_REQUEST, "Domain is required"),
    };

    info!("Summary requested for {} ({})", company, domain);

    let summary = tokio::select! {
        biased;
        _ = state.shutdown.cancelled() => Err(ScoutError::Cancelled),
        result = state.agent.summarize_domain(company, domain) => result,
    };

    match summary {
        Ok(summary) => Json(SummaryResponse {
            company_name: company.to_string(),
            domain,
            summary,
        })
        .into_response(),
        Err(e) => scout_error_response(e),
    }
}

fn required_company(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|c| !c.is_empty())
}

fn render(report: &CompanyResearch, format: OutputFormat) -> Response {
    match format {
        OutputFormat::Json => Json(report).into_response(),
        OutputFormat::Yaml => match to_yaml(report) {
            Ok(yaml) => ([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml).into_response(),
            Err(e) => scout_error_response(e),
        },
    }
}

fn scout_error_response(e: ScoutError) -> Response {
    match e {
        ScoutError::MissingInput(message) | ScoutError::InvalidInput(message) => {
            error_response(StatusCode::BAD_REQUEST, message)
        }
        other => {
            error!("Research failed: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use scout_core::{ScoutResult, SearchDepth, SearchResult};
    use scout_research::testing::{
        MockDocumentLoader, MockEmbedder, MockLanguageModel, MockSearchProvider,
    };
    use scout_research::{ResearchAgent, SearchProvider};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::app;

    struct Mocks {
        search: Arc<MockSearchProvider>,
        llm: Arc<MockLanguageModel>,
    }

    fn state_with(
        search: Arc<dyn SearchProvider>,
        llm: Arc<MockLanguageModel>,
        snapshot_path: Option<PathBuf>,
    ) -> AppState {
        let agent = ResearchAgent::new(
            search,
            Arc::new(MockDocumentLoader::new()),
            Arc::new(MockEmbedder::new()),
            llm,
        );
        AppState {
            agent: Arc::new(agent),
            snapshot_path,
            shutdown: CancellationToken::new(),
        }
    }

    fn setup(search: MockSearchProvider, llm: MockLanguageModel) -> (AppState, Mocks) {
        let search = Arc::new(search);
        let llm = Arc::new(llm);
        let state = state_with(search.clone(), llm.clone(), None);
        (state, Mocks { search, llm })
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_company_is_bad_request() {
        let (state, mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());

        for uri in ["/agent", "/agent?company=", "/agent?company=%20%20"] {
            let (status, _, body) = get(state.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["error"], "Company name is required");
        }

        assert_eq!(mocks.search.call_count(), 0);
        assert_eq!(mocks.llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_yaml_by_default() {
        let (state, _mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());

        let (status, content_type, body) = get(state, "/agent?company=Acme%20Corp").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/yaml"));
        let report: serde_yaml::Value = serde_yaml::from_str(&body).unwrap();
        assert_eq!(report["company_name"].as_str(), Some("Acme Corp"));
        assert_eq!(report["exists"].as_bool(), Some(false));
        assert_eq!(report["domains"].as_mapping().map(|m| m.len()), Some(6));
    }

    #[tokio::test]
    async fn test_json_format() {
        let (state, _mocks) = setup(
            MockSearchProvider::new()
                .with_urls("a real company", &["https://acme.example.com"])
                .with_urls("finance analysis", &["https://finance.example.com"]),
            MockLanguageModel::new()
                .with_answer("in the finance domain", r#"{"summary": "Profitable", "market_share": "NA"}"#),
        );

        let (status, content_type, body) =
            get(state, "/agent?company=Acme%20Corp&format=json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("application/json"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["exists"], true);
        assert_eq!(json["domains"]["finance"], serde_json::json!({"summary": "Profitable"}));
        assert_eq!(json["domains"]["markets"], serde_json::json!({}));
        assert_eq!(json["competitors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_format_is_bad_request() {
        let (state, mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());

        let (status, _, _) = get(state, "/agent?company=Acme&format=xml").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(mocks.search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_written_after_run() {
        let path = std::env::temp_dir().join(format!(
            "scout-api-snapshot-{}.yaml",
            std::process::id()
        ));
        let state = state_with(
            Arc::new(MockSearchProvider::new()),
            Arc::new(MockLanguageModel::new()),
            Some(path.clone()),
        );

        let (status, _, body) = get(state, "/agent?company=Acme%20Corp").await;
        assert_eq!(status, StatusCode::OK);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, body);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_cancelled_run_is_server_error() {
        let (state, _mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());
        state.shutdown.cancel();

        let (status, _, body) = get(state, "/agent?company=Acme").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("cancelled"));
    }

    struct PanickingSearch;

    #[async_trait]
    impl SearchProvider for PanickingSearch {
        async fn search(&self, _query: &str, _depth: SearchDepth) -> ScoutResult<Vec<SearchResult>> {
            panic!("search backend exploded");
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_server_error() {
        let state = state_with(
            Arc::new(PanickingSearch),
            Arc::new(MockLanguageModel::new()),
            None,
        );

        let (status, _, body) = get(state, "/agent?company=Acme").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "search backend exploded");
    }

    #[tokio::test]
    async fn test_domain_summary() {
        let (state, _mocks) = setup(
            MockSearchProvider::new().with_urls("political analysis", &["https://gov.example.com"]),
            MockLanguageModel::new().with_answer("summary of the following domain", "Acme lobbies."),
        );

        let (status, _, body) =
            get(state, "/agent/summary?company=Acme%20Corp&domain=political").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "company_name": "Acme Corp",
                "domain": "political",
                "summary": "Acme lobbies."
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_domain_is_bad_request() {
        let (state, mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());

        let (status, _, body) = get(state, "/agent/summary?company=Acme&domain=weather").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Unknown domain: weather");
        assert_eq!(mocks.search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _mocks) = setup(MockSearchProvider::new(), MockLanguageModel::new());
        let (status, _, body) = get(state, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
