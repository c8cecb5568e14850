use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use scout_core::{ScoutError, ScoutResult};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::providers::LanguageModel;

/// Chat completion client for OpenAI or any OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());

        Self {
            client: Client::with_config(config),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 2000,
        }
    }

    /// Use an OpenAI-compatible endpoint such as Groq
    pub fn with_api_base(mut self, api_key: impl Into<String>, api_base: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(api_base);
        self.client = Client::with_config(config);
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> ScoutResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| ScoutError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| ScoutError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| ScoutError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ScoutError::api(format!("LLM API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ScoutError::parse("No response from LLM"))?;

        debug!("LLM answered with {} chars", content.len());
        Ok(content)
    }
}

/// Pull the JSON payload out of a model answer
///
/// Handles fenced code blocks and prose around a bare object or array.
pub fn extract_json(content: &str) -> Result<String, ScoutError> {
    // Try to find JSON in code blocks first
    for fence in ["```json", "```"] {
        if let Some(start) = content.find(fence) {
            let start = start + fence.len();
            if let Some(end) = content[start..].find("```") {
                let candidate = content[start..start + end].trim();
                if candidate.starts_with('{') || candidate.starts_with('[') {
                    return Ok(candidate.to_string());
                }
            }
        }
    }

    // Otherwise take the first opener that starts a complete JSON payload;
    // prose brackets such as "[1]" are skipped
    content
        .char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(open, _)| json_payload_at(&content[open..]))
        .map(str::to_string)
        .ok_or_else(|| ScoutError::parse("No JSON found in response"))
}

/// The leading JSON value of `text` if it is an object or an array of objects
fn json_payload_at(text: &str) -> Option<&str> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    let value = stream.next()?.ok()?;
    let is_payload = match &value {
        Value::Object(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_object),
        _ => false,
    };
    is_payload.then(|| &text[..stream.byte_offset()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let content = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```\nThanks";
        assert_eq!(extract_json(content).unwrap(), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_extract_json_from_prose() {
        let content = "Sure! {\"summary\": \"ok\", \"news_links\": []} Hope that helps.";
        assert_eq!(
            extract_json(content).unwrap(),
            "{\"summary\": \"ok\", \"news_links\": []}"
        );
    }

    #[test]
    fn test_extract_json_array() {
        let content = "[{\"company_name\": \"Globex\"}]";
        assert_eq!(extract_json(content).unwrap(), content);
    }

    #[test]
    fn test_extract_json_skips_bracketed_prose() {
        let content = "Based on the context [1], here is the result:\n{\"summary\": \"Acme grew\", \"market_trends\": [\"AI\"]} [source]";
        assert_eq!(
            extract_json(content).unwrap(),
            "{\"summary\": \"Acme grew\", \"market_trends\": [\"AI\"]}"
        );
    }

    #[test]
    fn test_extract_json_array_after_citation() {
        let content = "Competitors [see 2]: [{\"company_name\": \"Globex\"}] per [3]";
        assert_eq!(extract_json(content).unwrap(), "[{\"company_name\": \"Globex\"}]");
    }

    #[test]
    fn test_extract_json_unbalanced_braces_rejected() {
        assert!(matches!(extract_json("{\"summary\": \"cut off"), Err(ScoutError::Parse(_))));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(matches!(extract_json("I could not find anything."), Err(ScoutError::Parse(_))));
    }
}
