mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};

use async_trait::async_trait;

use crate::error::ProductResult;

/// One embedded document from a batch request.
///
/// `index` is the provider's correlation field: it names the position of the
/// source text in the request, and is the only thing that ties a vector back
/// to its document. Consumers must correlate by it, never by array position.
#[derive(Debug, Clone)]
pub struct EmbeddingData {
    pub index: usize,
    pub vector: Vec<f32>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct BatchEmbedding {
    pub data: Vec<EmbeddingData>,
    pub usage: EmbeddingUsage,
}

/// Text embedding backend (OpenAI in production).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of documents. Result entries may arrive in any order;
    /// see [`EmbeddingData::index`].
    async fn embed_batch(&self, texts: &[String]) -> ProductResult<BatchEmbedding>;

    /// Embeds one query string.
    async fn embed_single(&self, text: &str) -> ProductResult<Vec<f32>>;
}
