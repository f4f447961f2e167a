use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BatchEmbedding, EmbeddingData, EmbeddingProvider, EmbeddingUsage};
use crate::error::{ProductError, ProductResult};

const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Reads `OPENAI_API_KEY` (required), `OPENAI_BASE_URL` and
    /// `OPENAI_EMBEDDING_MODEL` (optional) from the environment.
    pub fn from_env() -> ProductResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProductError::Config("OPENAI_API_KEY not set".to_string()))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model =
            std::env::var("OPENAI_EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> ProductResult<Self> {
        Ok(Self::new(OpenAIConfig::from_env()?))
    }

    async fn request(&self, input: Vec<String>) -> ProductResult<EmbeddingResponse> {
        let request = EmbeddingRequest {
            model: self.config.model.clone(),
            input,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProductError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProductError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProductError::Embedding(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<ResponseData>,
    usage: ResponseUsage,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed_batch(&self, texts: &[String]) -> ProductResult<BatchEmbedding> {
        if texts.is_empty() {
            return Ok(BatchEmbedding {
                data: vec![],
                usage: EmbeddingUsage::default(),
            });
        }

        let response = self.request(texts.to_vec()).await?;

        Ok(BatchEmbedding {
            data: response
                .data
                .into_iter()
                .map(|d| EmbeddingData {
                    index: d.index,
                    vector: d.embedding,
                })
                .collect(),
            usage: EmbeddingUsage {
                prompt_tokens: response.usage.prompt_tokens,
                total_tokens: response.usage.total_tokens,
            },
        })
    }

    async fn embed_single(&self, text: &str) -> ProductResult<Vec<f32>> {
        let response = self.request(vec![text.to_string()]).await?;

        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            total_tokens = response.usage.total_tokens,
            "query embedding usage"
        );

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProductError::Embedding("empty embedding response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenAIConfig::new("sk-test".to_string());
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "text-embedding-ada-002");
    }

    #[test]
    fn test_config_builders() {
        let config = OpenAIConfig::new("sk-test".to_string())
            .with_base_url("http://localhost:8081/v1".to_string())
            .with_model("text-embedding-3-small".to_string());
        assert_eq!(config.base_url, "http://localhost:8081/v1");
        assert_eq!(config.model, "text-embedding-3-small");
    }
}
