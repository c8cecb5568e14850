//! OpenAI embedding client

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::{
    error::{EmbeddingError, Result},
    types::{Embedder, EmbeddingVector},
};

/// Inputs sent per embeddings request
const EMBEDDING_BATCH_SIZE: usize = 64;

/// OpenAI embedding client
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// Uses text-embedding-3-small model (1536 dimensions)
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Use a different embedding model with its output dimension
    pub fn with_model(mut self, model: &str, dimension: usize) -> Self {
        self.model = model.to_string();
        self.dimension = dimension;
        self
    }

    /// Low-level embedding generation for one batch
    async fn generate_embeddings(&self, texts: Vec<String>) -> Result<Vec<EmbeddingVector>> {
        let expected = texts.len();
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(texts),
            encoding_format: None,
            dimensions: None,
            user: None,
        };

        let response = self.client.embeddings().create(request).await?;

        if response.data.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: response.data.len(),
            });
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let mut embeddings = Vec::with_capacity(expected);
        for item in data {
            // Validate dimension
            if item.embedding.len() != self.dimension {
                return Err(EmbeddingError::InvalidDimension {
                    expected: self.dimension,
                    actual: item.embedding.len(),
                });
            }
            embeddings.push(item.embedding);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            debug!("Embedding batch of {} documents", batch.len());
            embeddings.extend(self.generate_embeddings(batch.to_vec()).await?);
        }

        info!(
            "Generated {} embeddings: dimension={}, model={}",
            embeddings.len(),
            self.dimension,
            self.model
        );

        Ok(embeddings)
    }

    #[instrument(skip(self))]
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector> {
        self.generate_embeddings(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::Provider("No embeddings returned from API".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_embed_documents() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let client = EmbeddingClient::new(api_key);

        let embeddings = client
            .embed_documents(&[
                "Acme Corp reported record revenue".to_string(),
                "Acme faces an antitrust probe".to_string(),
            ])
            .await
            .expect("Failed to generate embeddings");

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 1536);
    }
}
