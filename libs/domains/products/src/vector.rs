use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;

/// One point to upsert into the vector index.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
}

/// One similarity-search match.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub id: Uuid,
    pub score: f32,
}

/// Similarity-search backend (Qdrant in production).
///
/// Collections are segregated by vector dimensionality: each embedding
/// model's output lands in its own collection, created lazily.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection for `dim`-sized vectors when missing.
    /// Idempotent; concurrent creation of the same collection must not
    /// surface an error.
    async fn ensure_collection(&self, dim: usize) -> ProductResult<()>;

    /// Upserts points into the `dim` collection.
    async fn upsert(&self, dim: usize, points: Vec<VectorPoint>) -> ProductResult<()>;

    /// Returns up to `top_k` nearest neighbours of `vector`, best first.
    async fn search(
        &self,
        dim: usize,
        vector: &[f32],
        top_k: usize,
    ) -> ProductResult<Vec<VectorHit>>;
}
