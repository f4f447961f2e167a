use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::Product;

/// A query against the keyword index, already classified by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordQuery {
    /// Exact SKU term lookup
    Sku(String),
    /// Disjunctive match over sku, title and description
    FreeText(String),
}

/// Lexical search backend for products.
///
/// Implementations provide full-text and exact-term retrieval over the
/// product catalog (Elasticsearch in production).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeywordIndex: Send + Sync {
    /// Creates the index with its mapping when it does not exist yet.
    async fn ensure_index(&self) -> ProductResult<()>;

    /// Number of documents in the index.
    async fn count(&self) -> ProductResult<i64>;

    /// Writes the whole batch; partial writes surface as errors.
    async fn bulk_upsert(&self, products: &[Product]) -> ProductResult<()>;

    /// Runs `query`, returning one page of results ordered by descending
    /// relevance score, plus the total number of matches.
    async fn search(
        &self,
        query: &KeywordQuery,
        from: i64,
        size: i64,
    ) -> ProductResult<(Vec<Product>, i64)>;

    /// Fetches full records for the given ids. Unknown ids are skipped;
    /// result order is the index's, not the input's.
    async fn search_by_ids(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>>;

    /// Destroys the index and recreates it empty.
    async fn drop_and_recreate(&self) -> ProductResult<()>;
}
