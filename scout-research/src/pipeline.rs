//! Research pipeline
//!
//! A run consists of one existence check, six domain stages and one
//! competitor stage, followed by formatting. Stages only read the company
//! name and only write their own slot, so they run concurrently and are
//! joined before the formatter. No stage can fail the run: any provider
//! failure degrades that stage to its empty default.
//!
//! Stage futures are polled inside the caller's task rather than spawned, so
//! dropping a run (for example when an HTTP client disconnects) drops every
//! in-flight provider call with it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use scout_core::{
    Chunk, CompanyResearch, Competitor, DomainInfo, DomainKey, ScoutError, ScoutResult,
    SearchDepth, SearchResult,
};
use scout_embedding::{retrieve_context, Embedder, VectorIndex, DEFAULT_TOP_K};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::extractor::StructuredExtractor;
use crate::providers::{DocumentLoader, LanguageModel, SearchProvider};
use crate::state::{
    format_results, EmptyReason, ResearchState, StageKey, StageOutcome, StageValue,
};

/// Tunables for a research run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub search_depth: SearchDepth,
    /// Chunks retrieved per stage
    pub top_k: usize,
    /// Upper bound for every single provider call
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            search_depth: SearchDepth::Advanced,
            top_k: DEFAULT_TOP_K,
            call_timeout: Duration::from_secs(60),
        }
    }
}

pub fn existence_query(company_name: &str) -> String {
    format!("Is {} a real company?", company_name)
}

pub fn domain_query(company_name: &str, domain: DomainKey) -> String {
    format!("{} {} analysis", company_name, domain)
}

pub fn competitors_query(company_name: &str) -> String {
    format!("{} competitors", company_name)
}

/// Orchestrates one research run over injected providers
#[derive(Clone)]
pub struct ResearchAgent {
    search: Arc<dyn SearchProvider>,
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    extractor: StructuredExtractor,
    settings: PipelineSettings,
}

impl ResearchAgent {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            search,
            loader,
            embedder,
            extractor: StructuredExtractor::new(llm),
            settings: PipelineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Research a company and return the formatted report
    ///
    /// Fails only for a blank company name or an internal defect; provider
    /// failures show up as empty sections of the report.
    #[instrument(skip(self))]
    pub async fn run(&self, company_name: &str) -> ScoutResult<CompanyResearch> {
        let company = validate_company(company_name)?;
        info!("Starting research for {}", company);

        let (exists, domains, competitors) = tokio::join!(
            self.check_exists(company),
            join_all(
                DomainKey::ALL
                    .iter()
                    .map(|domain| self.research_domain(company, *domain))
            ),
            self.research_competitors(company),
        );

        let mut state = ResearchState::new(company);
        state.record(StageKey::Exists, StageValue::Exists(exists))?;

        for (domain, outcome) in DomainKey::ALL.iter().zip(domains) {
            log_outcome(StageKey::Domain(*domain), &outcome);
            state.record(StageKey::Domain(*domain), StageValue::Domain(outcome.into_value()))?;
        }

        log_outcome(StageKey::Competitors, &competitors);
        state.record(
            StageKey::Competitors,
            StageValue::Competitors(competitors.into_value()),
        )?;

        let report = format_results(state);
        info!(
            "Research complete for {}: exists={}, {} domains with findings, {} competitors",
            report.company_name,
            report.exists,
            report.domains.values().filter(|d| !d.is_empty()).count(),
            report.competitors.len()
        );
        Ok(report)
    }

    /// Like [`run`](Self::run), but stops as soon as `cancel` fires
    pub async fn run_with_cancel(
        &self,
        company_name: &str,
        cancel: CancellationToken,
    ) -> ScoutResult<CompanyResearch> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Research for {} cancelled", company_name);
                Err(ScoutError::Cancelled)
            }
            result = self.run(company_name) => result,
        }
    }

    /// Markdown summary for a single domain
    ///
    /// Runs the domain's retrieval steps and asks the model for prose instead
    /// of a structured record. Degrades to an empty summary.
    #[instrument(skip(self))]
    pub async fn summarize_domain(
        &self,
        company_name: &str,
        domain: DomainKey,
    ) -> ScoutResult<String> {
        let company = validate_company(company_name)?;
        let query = domain_query(company, domain);

        let context = match self.gather_context(&query).await {
            Ok(context) => context,
            Err(reason) => {
                info!("No summary for {} {}: {}", company, domain, reason);
                return Ok(String::new());
            }
        };

        match self
            .guarded(
                "summarize",
                self.extractor.summarize_domain(company, domain, &context),
            )
            .await
        {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!("Error creating {} summary for {}: {}", domain, company, e);
                Ok(String::new())
            }
        }
    }

    /// Best-effort: any search hit counts as the company existing
    async fn check_exists(&self, company: &str) -> bool {
        let query = existence_query(company);
        match self
            .guarded("search", self.search.search(&query, self.settings.search_depth))
            .await
        {
            Ok(results) => !results.is_empty(),
            Err(e) => {
                warn!("Existence check failed for {}: {}", company, e);
                false
            }
        }
    }

    async fn research_domain(&self, company: &str, domain: DomainKey) -> StageOutcome<DomainInfo> {
        let query = domain_query(company, domain);
        let context = match self.gather_context(&query).await {
            Ok(context) => context,
            Err(reason) => return StageOutcome::Empty(reason),
        };

        match self
            .guarded(
                "extract",
                self.extractor.extract_domain_info(company, domain, &context),
            )
            .await
        {
            Ok(info) => StageOutcome::Found(info),
            Err(e) => {
                warn!("Error extracting {} information: {}", domain, e);
                StageOutcome::Empty(EmptyReason::from_error(&e, EmptyReason::ExtractionFailed))
            }
        }
    }

    async fn research_competitors(&self, company: &str) -> StageOutcome<Vec<Competitor>> {
        let query = competitors_query(company);
        let context = match self.gather_context(&query).await {
            Ok(context) => context,
            Err(reason) => return StageOutcome::Empty(reason),
        };

        match self
            .guarded("extract", self.extractor.extract_competitors(company, &context))
            .await
        {
            Ok(competitors) => StageOutcome::Found(competitors),
            Err(e) => {
                warn!("Error extracting competitor information: {}", e);
                StageOutcome::Empty(EmptyReason::from_error(&e, EmptyReason::ExtractionFailed))
            }
        }
    }

    /// Search, load, index and retrieve the context for one query
    async fn gather_context(&self, query: &str) -> Result<String, EmptyReason> {
        let results = self
            .guarded("search", self.search.search(query, self.settings.search_depth))
            .await
            .map_err(|e| {
                warn!("Search failed for {:?}: {}", query, e);
                EmptyReason::from_error(&e, EmptyReason::SearchFailed)
            })?;

        if results.is_empty() {
            info!("No search results found for {:?}", query);
            return Err(EmptyReason::NoSearchResults);
        }

        let chunks = self.load_chunks(&results).await;
        if chunks.is_empty() {
            info!("No documents could be loaded for {:?}", query);
            return Err(EmptyReason::NoChunks);
        }

        let index = self
            .guarded("index", VectorIndex::build(self.embedder.as_ref(), chunks))
            .await
            .map_err(|e| {
                warn!("Error creating vector index for {:?}: {}", query, e);
                EmptyReason::from_error(&e, EmptyReason::IndexFailed)
            })?
            .ok_or(EmptyReason::NoChunks)?;

        let context = self
            .guarded(
                "retrieve",
                retrieve_context(
                    self.embedder.as_ref(),
                    Some(&index),
                    query,
                    self.settings.top_k,
                ),
            )
            .await
            .map_err(|e| {
                warn!("Error retrieving context for {:?}: {}", query, e);
                EmptyReason::from_error(&e, EmptyReason::IndexFailed)
            })?;

        if context.trim().is_empty() {
            return Err(EmptyReason::NoContext);
        }

        debug!("Retrieved {} chars of context for {:?}", context.len(), query);
        Ok(context)
    }

    /// Load every result with a URL; chunks keep result order, then
    /// document order. Failed loads contribute nothing.
    async fn load_chunks(&self, results: &[SearchResult]) -> Vec<Chunk> {
        let loads = results
            .iter()
            .filter_map(|r| r.url.as_deref())
            .map(|url| async move {
                match self.guarded("load", self.loader.load(url)).await {
                    Ok(chunks) => chunks,
                    Err(e) => {
                        warn!("Error loading and chunking data from {}: {}", url, e);
                        Vec::new()
                    }
                }
            });

        join_all(loads).await.into_iter().flatten().collect()
    }

    /// Apply the per-call timeout and unify the error type
    async fn guarded<T, E, F>(&self, operation: &str, call: F) -> ScoutResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ScoutError>,
    {
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ScoutError::timeout(
                operation,
                self.settings.call_timeout.as_secs(),
            )),
        }
    }
}

fn validate_company(company_name: &str) -> ScoutResult<&str> {
    let company = company_name.trim();
    if company.is_empty() {
        return Err(ScoutError::missing_input("Company name is required"));
    }
    Ok(company)
}

fn log_outcome<T>(key: StageKey, outcome: &StageOutcome<T>) {
    match outcome.empty_reason() {
        None => debug!("Stage {} found results", key),
        Some(reason) => info!("Stage {} recorded empty default: {}", key, reason),
    }
}
