//! `NA` sentinel handling for model-extracted records
//!
//! The extraction prompt asks the model to answer `NA` when a piece of
//! information is not available. Parsing is lenient about shapes (a list
//! field answered with a bare string becomes a one-item list) and
//! [`Normalize`] then maps the sentinel away:
//!
//! - scalar `"NA"` becomes `None`
//! - `"NA"` items are removed from lists, so `"NA"` alone becomes `[]`
//! - `key_metrics` is normalized recursively and dropped when nothing is left
//!
//! Normalization is a pure function and idempotent.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

use crate::report::{Competitor, CompetitorList, DomainInfo, KeyMetrics};

/// Literal the model uses for "not available"
pub const NOT_AVAILABLE: &str = "NA";

pub fn is_sentinel(value: &str) -> bool {
    value.trim() == NOT_AVAILABLE
}

/// Post-parse sentinel normalization
pub trait Normalize: Sized {
    fn normalize(self) -> Self;
}

fn scalar(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_sentinel(v))
}

fn list(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|v| !is_sentinel(v)).collect()
}

impl Normalize for KeyMetrics {
    fn normalize(self) -> Self {
        KeyMetrics {
            revenue: scalar(self.revenue),
            profit: scalar(self.profit),
            market_cap: scalar(self.market_cap),
        }
    }
}

impl Normalize for Option<KeyMetrics> {
    fn normalize(self) -> Self {
        self.map(Normalize::normalize).filter(|m| !m.is_empty())
    }
}

impl Normalize for DomainInfo {
    fn normalize(self) -> Self {
        DomainInfo {
            summary: scalar(self.summary),
            key_metrics: self.key_metrics.normalize(),
            market_share: scalar(self.market_share),
            market_trends: list(self.market_trends),
            competitors: list(self.competitors),
            legal_issues: list(self.legal_issues),
            regulatory_environment: scalar(self.regulatory_environment),
            lobbying_activities: scalar(self.lobbying_activities),
            political_contributions: scalar(self.political_contributions),
            demographics: scalar(self.demographics),
            sentiment: scalar(self.sentiment),
            news_links: list(self.news_links),
        }
    }
}

impl Normalize for Competitor {
    fn normalize(self) -> Self {
        Competitor {
            company_name: self.company_name,
            summary: scalar(self.summary),
            key_metrics: self.key_metrics.normalize(),
        }
    }
}

/// Normalizes each competitor and drops entries without a usable name
impl Normalize for Vec<Competitor> {
    fn normalize(self) -> Self {
        self.into_iter()
            .filter(|c| !c.company_name.trim().is_empty() && !is_sentinel(&c.company_name))
            .map(Normalize::normalize)
            .collect()
    }
}

impl Normalize for CompetitorList {
    fn normalize(self) -> Self {
        CompetitorList {
            competitors: self.competitors.normalize(),
        }
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    })
}

pub(crate) fn lenient_metrics<'de, D>(deserializer: D) -> Result<Option<KeyMetrics>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object)
            .map(Some)
            .map_err(D::Error::custom),
        // "NA" or any other non-object answer carries no metrics
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_domain() -> DomainInfo {
        DomainInfo {
            summary: Some("NA".to_string()),
            key_metrics: Some(KeyMetrics {
                revenue: Some("$10B".to_string()),
                profit: Some("NA".to_string()),
                market_cap: None,
            }),
            market_share: Some("12%".to_string()),
            market_trends: vec!["NA".to_string()],
            competitors: vec!["NA".to_string(), "Globex".to_string()],
            sentiment: Some("positive".to_string()),
            ..DomainInfo::default()
        }
    }

    #[test]
    fn test_scalar_sentinel_becomes_absent() {
        let info = raw_domain().normalize();
        assert_eq!(info.summary, None);
        assert_eq!(info.market_share.as_deref(), Some("12%"));
        assert_eq!(info.sentiment.as_deref(), Some("positive"));
    }

    #[test]
    fn test_list_sentinel_items_are_removed() {
        let info = raw_domain().normalize();
        assert!(info.market_trends.is_empty());
        assert_eq!(info.competitors, vec!["Globex".to_string()]);
    }

    #[test]
    fn test_key_metrics_are_normalized_recursively() {
        let info = raw_domain().normalize();
        let metrics = info.key_metrics.expect("revenue survives");
        assert_eq!(metrics.revenue.as_deref(), Some("$10B"));
        assert_eq!(metrics.profit, None);

        let all_na = Some(KeyMetrics {
            revenue: Some("NA".to_string()),
            profit: Some("NA".to_string()),
            market_cap: Some("NA".to_string()),
        });
        assert_eq!(all_na.normalize(), None);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = raw_domain().normalize();
        assert_eq!(once.clone().normalize(), once);

        let competitors = vec![
            Competitor {
                company_name: "Globex".to_string(),
                summary: Some("NA".to_string()),
                key_metrics: Some(KeyMetrics {
                    revenue: Some("NA".to_string()),
                    profit: None,
                    market_cap: Some("$2B".to_string()),
                }),
            },
            Competitor {
                company_name: "NA".to_string(),
                summary: None,
                key_metrics: None,
            },
        ];
        let once = competitors.normalize();
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].summary, None);
        assert_eq!(once[0].key_metrics.as_ref().unwrap().revenue, None);
        assert_eq!(once.clone().normalize(), once);
    }

    #[test]
    fn test_sentinel_string_in_list_field_parses_to_empty() {
        let info: DomainInfo =
            serde_json::from_str(r#"{"news_links": "NA", "legal_issues": ["NA", "x"]}"#).unwrap();
        let info = info.normalize();
        assert!(info.news_links.is_empty());
        assert_eq!(info.legal_issues, vec!["x".to_string()]);
    }

    #[test]
    fn test_competitor_metrics_sentinel_object() {
        let list: CompetitorList = serde_json::from_str(
            r#"{"competitors": [{"company_name": "Initech", "summary": "NA", "key_metrics": "NA"}]}"#,
        )
        .unwrap();
        let list = list.normalize();
        assert_eq!(list.competitors.len(), 1);
        assert_eq!(list.competitors[0].company_name, "Initech");
        assert_eq!(list.competitors[0].summary, None);
        assert_eq!(list.competitors[0].key_metrics, None);
    }
}
