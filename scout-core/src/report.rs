//! Research report types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;
use crate::sentinel::{lenient_list, lenient_metrics, lenient_text};

/// The six fixed analytical domains researched for every company
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKey {
    Finance,
    Markets,
    Audience,
    Paralegal,
    Political,
    General,
}

impl DomainKey {
    /// All domains in pipeline order
    pub const ALL: [DomainKey; 6] = [
        DomainKey::Finance,
        DomainKey::Markets,
        DomainKey::Audience,
        DomainKey::Paralegal,
        DomainKey::Political,
        DomainKey::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKey::Finance => "finance",
            DomainKey::Markets => "markets",
            DomainKey::Audience => "audience",
            DomainKey::Paralegal => "paralegal",
            DomainKey::Political => "political",
            DomainKey::General => "general",
        }
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKey {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finance" => Ok(DomainKey::Finance),
            "markets" => Ok(DomainKey::Markets),
            "audience" => Ok(DomainKey::Audience),
            "paralegal" | "legal" => Ok(DomainKey::Paralegal),
            "political" => Ok(DomainKey::Political),
            "general" => Ok(DomainKey::General),
            other => Err(ScoutError::invalid_input(format!("Unknown domain: {}", other))),
        }
    }
}

/// Headline financial figures, kept as free text ("$3.4B", "12% YoY")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub profit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
}

impl KeyMetrics {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_none() && self.profit.is_none() && self.market_cap.is_none()
    }
}

/// Structured findings for one domain
///
/// Every field is optional; `DomainInfo::default()` serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_metrics", skip_serializing_if = "Option::is_none")]
    pub key_metrics: Option<KeyMetrics>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub market_share: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub market_trends: Vec<String>,
    /// Competitor names mentioned in this domain's sources
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub competitors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub legal_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub regulatory_environment: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub lobbying_activities: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub political_contributions: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub demographics: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub news_links: Vec<String>,
}

impl DomainInfo {
    pub fn is_empty(&self) -> bool {
        *self == DomainInfo::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default)]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_metrics", skip_serializing_if = "Option::is_none")]
    pub key_metrics: Option<KeyMetrics>,
}

/// Envelope the LLM is asked to produce for competitor extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorList {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// Final report for one research run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyResearch {
    pub company_name: String,
    /// Best-effort: true when the existence search returned any hit
    pub exists: bool,
    pub domains: BTreeMap<DomainKey, DomainInfo>,
    pub competitors: Vec<Competitor>,
}

impl CompanyResearch {
    /// Report with every domain present and empty
    pub fn empty(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            exists: false,
            domains: DomainKey::ALL
                .iter()
                .map(|key| (*key, DomainInfo::default()))
                .collect(),
            competitors: Vec::new(),
        }
    }

    pub fn domain(&self, key: DomainKey) -> Option<&DomainInfo> {
        self.domains.get(&key)
    }
}
