//! Structured extraction of research findings from retrieved context
//!
//! The model is asked to answer in JSON matching a declared schema and to use
//! `NA` for anything the context does not cover. Answers are parsed
//! leniently and then run through sentinel normalization.

use std::sync::Arc;

use scout_core::{
    CompetitorList, Competitor, DomainInfo, DomainKey, Normalize, ScoutError, ScoutResult,
};
use tracing::{debug, instrument};

use crate::llm::extract_json;
use crate::providers::LanguageModel;

const SYSTEM_PROMPT: &str = "You are a meticulous company research assistant. \
You only report facts supported by the context you are given and you always answer in the requested format.";

const DOMAIN_SCHEMA: &str = r#"{
  "summary": "Summary of information in this domain (string or \"NA\")",
  "key_metrics": {
    "revenue": "Annual revenue (string or \"NA\")",
    "profit": "Annual profit (string or \"NA\")",
    "market_cap": "Market capitalization (string or \"NA\")"
  },
  "market_share": "Market share of the company (string or \"NA\")",
  "market_trends": ["Market trend", "..."],
  "competitors": ["Competitor mentioned in this domain", "..."],
  "legal_issues": ["Legal issue", "..."],
  "regulatory_environment": "Description of the regulatory environment (string or \"NA\")",
  "lobbying_activities": "Description of lobbying activities (string or \"NA\")",
  "political_contributions": "Description of political contributions (string or \"NA\")",
  "demographics": "Description of audience demographics (string or \"NA\")",
  "sentiment": "Audience sentiment towards the company (string or \"NA\")",
  "news_links": ["Relevant news URL", "..."]
}"#;

const COMPETITOR_SCHEMA: &str = r#"{
  "competitors": [
    {
      "company_name": "Name of the competitor (required)",
      "summary": "Brief summary of the competitor (string or \"NA\")",
      "key_metrics": {
        "revenue": "Annual revenue (string or \"NA\")",
        "profit": "Annual profit (string or \"NA\")",
        "market_cap": "Market capitalization (string or \"NA\")"
      }
    }
  ]
}"#;

/// Turns free-text context into normalized report records
#[derive(Clone)]
pub struct StructuredExtractor {
    llm: Arc<dyn LanguageModel>,
}

impl StructuredExtractor {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Extract the findings for one domain
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn extract_domain_info(
        &self,
        company_name: &str,
        domain: DomainKey,
        context: &str,
    ) -> ScoutResult<DomainInfo> {
        let prompt = format!(
            r#"You are a research assistant tasked with extracting information about {company} in the {domain} domain.
You should use the following context to extract the information. If the information isn't available respond with 'NA'.

{context}

You must respond in a JSON format that adheres to the following schema:
{schema}

Respond with the JSON object only."#,
            company = company_name,
            domain = domain,
            context = context,
            schema = DOMAIN_SCHEMA,
        );

        let answer = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        parse_domain_info(&answer)
    }

    /// Extract the competitor landscape
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn extract_competitors(
        &self,
        company_name: &str,
        context: &str,
    ) -> ScoutResult<Vec<Competitor>> {
        let prompt = format!(
            r#"You are a research assistant tasked with extracting information about competitors of {company}.
You should use the following context to extract the information. If a competitor isn't mentioned or information isn't available, respond with 'NA'.

{context}

You must respond in a JSON format that adheres to the following schema:
{schema}

Respond with the JSON object only."#,
            company = company_name,
            context = context,
            schema = COMPETITOR_SCHEMA,
        );

        let answer = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        parse_competitors(&answer)
    }

    /// Free-text markdown summary of one domain
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn summarize_domain(
        &self,
        company_name: &str,
        domain: DomainKey,
        context: &str,
    ) -> ScoutResult<String> {
        let prompt = format!(
            r#"You are a research assistant tasked with creating a summary of the following domain for {company}: {domain}.
Your summary should cover the key aspects of the domain, including relevant metrics, trends, and competitors.
Use the following context to create the summary:

{context}
Include news links in your summary if available.
Return your answer in markdown format:"#,
            company = company_name,
            domain = domain,
            context = context,
        );

        let answer = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        Ok(answer.trim().to_string())
    }
}

/// Parse and normalize a domain answer
pub fn parse_domain_info(answer: &str) -> ScoutResult<DomainInfo> {
    let json = extract_json(answer)?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| ScoutError::parse(format!("Invalid JSON for domain info: {}", e)))?;

    if !value.is_object() {
        return Err(ScoutError::parse("Domain info must be a JSON object"));
    }

    let info: DomainInfo = serde_json::from_value(value)
        .map_err(|e| ScoutError::parse(format!("Domain info does not match schema: {}", e)))?;

    let info = info.normalize();
    debug!("Parsed domain info (empty: {})", info.is_empty());
    Ok(info)
}

/// Parse and normalize a competitor answer
///
/// Accepts the declared `{"competitors": [...]}` envelope or a bare array.
pub fn parse_competitors(answer: &str) -> ScoutResult<Vec<Competitor>> {
    let json = extract_json(answer)?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| ScoutError::parse(format!("Invalid JSON for competitors: {}", e)))?;

    let list: CompetitorList = match value {
        serde_json::Value::Array(_) => CompetitorList {
            competitors: serde_json::from_value(value).map_err(|e| {
                ScoutError::parse(format!("Competitors do not match schema: {}", e))
            })?,
        },
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| ScoutError::parse(format!("Competitors do not match schema: {}", e)))?,
        _ => return Err(ScoutError::parse("Competitors must be a JSON object or array")),
    };

    Ok(list.normalize().competitors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;

    #[test]
    fn test_parse_domain_info_normalizes_sentinels() {
        let answer = r#"```json
{
  "summary": "Acme dominates the anvil market",
  "key_metrics": {"revenue": "$1.2B", "profit": "NA", "market_cap": "NA"},
  "market_share": "NA",
  "market_trends": "NA",
  "competitors": ["NA", "Globex"],
  "news_links": ["https://news.example/acme"]
}
```"#;
        let info = parse_domain_info(answer).unwrap();
        assert_eq!(info.summary.as_deref(), Some("Acme dominates the anvil market"));
        assert_eq!(info.market_share, None);
        assert!(info.market_trends.is_empty());
        assert_eq!(info.competitors, vec!["Globex".to_string()]);
        let metrics = info.key_metrics.unwrap();
        assert_eq!(metrics.revenue.as_deref(), Some("$1.2B"));
        assert_eq!(metrics.profit, None);
    }

    #[test]
    fn test_parse_domain_info_rejects_invalid_json() {
        assert!(parse_domain_info("{\"summary\": ").is_err());
        assert!(parse_domain_info("no json here").is_err());
        assert!(parse_domain_info("[\"not\", \"an object\"]").is_err());
    }

    #[test]
    fn test_parse_domain_info_after_cited_prose() {
        let info = parse_domain_info(
            "Based on the context [1], here is the result:\n{\"summary\": \"Acme grew\", \"market_trends\": [\"AI\"]}",
        )
        .unwrap();
        assert_eq!(info.summary.as_deref(), Some("Acme grew"));
        assert_eq!(info.market_trends, vec!["AI".to_string()]);
    }

    #[test]
    fn test_parse_competitors_envelope_and_array() {
        let envelope = r#"{"competitors": [
            {"company_name": "Globex", "summary": "NA", "key_metrics": {"revenue": "NA", "profit": "NA", "market_cap": "$5B"}},
            {"company_name": "NA"}
        ]}"#;
        let competitors = parse_competitors(envelope).unwrap();
        assert_eq!(competitors.len(), 1);
        assert_eq!(competitors[0].company_name, "Globex");
        assert_eq!(competitors[0].summary, None);
        assert_eq!(
            competitors[0].key_metrics.as_ref().unwrap().market_cap.as_deref(),
            Some("$5B")
        );

        let bare = r#"[{"company_name": "Initech", "summary": "Office software"}]"#;
        let competitors = parse_competitors(bare).unwrap();
        assert_eq!(competitors[0].summary.as_deref(), Some("Office software"));
    }

    #[tokio::test]
    async fn test_extract_domain_info_prompts_with_context() {
        let llm = Arc::new(MockLanguageModel::new().with_default_answer(r#"{"summary": "ok"}"#));
        let extractor = StructuredExtractor::new(llm.clone());

        let info = extractor
            .extract_domain_info("Acme Corp", DomainKey::Political, "Acme lobbies for tariffs")
            .await
            .unwrap();

        assert_eq!(info.summary.as_deref(), Some("ok"));
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Acme Corp in the political domain"));
        assert!(prompts[0].contains("Acme lobbies for tariffs"));
        assert!(prompts[0].contains("respond with 'NA'"));
    }

    #[tokio::test]
    async fn test_extract_propagates_provider_error() {
        let llm = Arc::new(MockLanguageModel::new().failing_on("competitors of"));
        let extractor = StructuredExtractor::new(llm);
        let err = extractor
            .extract_competitors("Acme Corp", "context")
            .await
            .unwrap_err();
        assert!(err.is_provider_error());
    }
}
