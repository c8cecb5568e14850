//! Per-run research state, stage outcomes and the result formatter

use std::collections::HashMap;
use std::fmt;

use scout_core::{CompanyResearch, Competitor, DomainInfo, DomainKey, ScoutError, ScoutResult};

/// Slot a stage writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKey {
    Exists,
    Domain(DomainKey),
    Competitors,
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKey::Exists => f.write_str("exists"),
            StageKey::Domain(domain) => write!(f, "{}", domain),
            StageKey::Competitors => f.write_str("competitors"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageValue {
    Exists(bool),
    Domain(DomainInfo),
    Competitors(Vec<Competitor>),
}

/// Why a stage recorded its empty default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoSearchResults,
    SearchFailed,
    NoChunks,
    IndexFailed,
    NoContext,
    ExtractionFailed,
    TimedOut,
}

impl EmptyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyReason::NoSearchResults => "no search results",
            EmptyReason::SearchFailed => "search failed",
            EmptyReason::NoChunks => "no documents could be loaded",
            EmptyReason::IndexFailed => "embedding or retrieval failed",
            EmptyReason::NoContext => "no relevant context",
            EmptyReason::ExtractionFailed => "structured extraction failed",
            EmptyReason::TimedOut => "provider call timed out",
        }
    }

    /// Timeouts are reported as such whatever step they hit
    pub(crate) fn from_error(err: &ScoutError, otherwise: EmptyReason) -> Self {
        match err {
            ScoutError::Timeout { .. } => EmptyReason::TimedOut,
            _ => otherwise,
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one research stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Found(T),
    Empty(EmptyReason),
}

impl<T: Default> StageOutcome<T> {
    /// The found value, or the stage's empty default
    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Found(value) => value,
            StageOutcome::Empty(_) => T::default(),
        }
    }
}

impl<T> StageOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, StageOutcome::Found(_))
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            StageOutcome::Found(_) => None,
            StageOutcome::Empty(reason) => Some(*reason),
        }
    }
}

/// Accumulator for one research run
///
/// Every stage owns exactly one slot. Writing a slot twice, or writing a
/// value of the wrong kind, is a defect in the agent and is reported as an
/// internal error.
#[derive(Debug, Clone)]
pub struct ResearchState {
    company_name: String,
    results: HashMap<StageKey, StageValue>,
}

impl ResearchState {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            results: HashMap::new(),
        }
    }

    pub fn get(&self, key: StageKey) -> Option<&StageValue> {
        self.results.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn record(&mut self, key: StageKey, value: StageValue) -> ScoutResult<()> {
        let kind_matches = matches!(
            (&key, &value),
            (StageKey::Exists, StageValue::Exists(_))
                | (StageKey::Domain(_), StageValue::Domain(_))
                | (StageKey::Competitors, StageValue::Competitors(_))
        );
        if !kind_matches {
            return Err(ScoutError::internal(format!(
                "Stage {} produced a value of the wrong kind",
                key
            )));
        }

        if self.results.contains_key(&key) {
            return Err(ScoutError::internal(format!(
                "Stage {} recorded more than once",
                key
            )));
        }

        self.results.insert(key, value);
        Ok(())
    }
}

/// Assemble the final report, defaulting every missing slot
pub fn format_results(mut state: ResearchState) -> CompanyResearch {
    let exists = match state.results.remove(&StageKey::Exists) {
        Some(StageValue::Exists(exists)) => exists,
        _ => false,
    };

    let domains = DomainKey::ALL
        .iter()
        .map(|domain| {
            let info = match state.results.remove(&StageKey::Domain(*domain)) {
                Some(StageValue::Domain(info)) => info,
                _ => DomainInfo::default(),
            };
            (*domain, info)
        })
        .collect();

    let competitors = match state.results.remove(&StageKey::Competitors) {
        Some(StageValue::Competitors(competitors)) => competitors,
        _ => Vec::new(),
    };

    CompanyResearch {
        company_name: state.company_name,
        exists,
        domains,
        competitors,
    }
}
