//! Product service - query orchestration and ingestion pipeline.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::embedding::EmbeddingProvider;
use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, IngestReport, Product};
use crate::repository::{KeywordIndex, KeywordQuery};
use crate::vector::{VectorPoint, VectorStore};

/// Embedding provider and vector index, configured together or not at all.
struct SemanticBackend {
    vector: Arc<dyn VectorStore>,
    embedding: Arc<dyn EmbeddingProvider>,
}

/// Orchestrates lexical search, the semantic fallback and batch ingestion.
pub struct ProductService<R: KeywordIndex> {
    keyword: Arc<R>,
    semantic: Option<SemanticBackend>,
}

/// A keyword is an identifier (SKU) lookup when it contains no letter that
/// is not uppercase. Digits, hyphens and whitespace pass through, so the
/// empty string also classifies as an identifier.
fn is_identifier_query(keyword: &str) -> bool {
    !keyword
        .chars()
        .any(|c| c.is_alphabetic() && !c.is_uppercase())
}

impl<R: KeywordIndex> ProductService<R> {
    pub fn new(keyword: R) -> Self {
        Self {
            keyword: Arc::new(keyword),
            semantic: None,
        }
    }

    /// Enables the semantic fallback and the ingestion vector path.
    pub fn with_semantic(
        mut self,
        vector: Arc<dyn VectorStore>,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        self.semantic = Some(SemanticBackend { vector, embedding });
        self
    }

    /// One-time startup work: make sure the keyword index exists.
    ///
    /// Failures are reported to the host binary, which decides whether to
    /// exit; nothing here terminates the process.
    pub async fn bootstrap(&self) -> ProductResult<()> {
        self.keyword
            .ensure_index()
            .await
            .map_err(|e| ProductError::Init(e.to_string()))
    }

    /// Searches the catalog.
    ///
    /// Identifier keywords (uppercase-only letters) issue a single exact
    /// SKU lookup with no fallback. Free-text keywords run a disjunctive
    /// lexical query first; when that returns zero hits and a semantic
    /// backend is configured, the raw keyword is embedded once and the
    /// nearest `size` products are re-fetched from the keyword index.
    /// On the fallback path `total` is the number of re-fetched records
    /// and ordering follows the re-fetch, not similarity.
    #[instrument(skip(self), fields(keyword = %keyword))]
    pub async fn query(
        &self,
        keyword: &str,
        from: i64,
        size: i64,
    ) -> ProductResult<(Vec<Product>, i64)> {
        let identifier = is_identifier_query(keyword);

        let query = if identifier {
            KeywordQuery::Sku(keyword.to_string())
        } else {
            // Tokens are joined with a literal "AND" word inside one match
            // string; deployed result rankings depend on it.
            let joined = keyword.split_whitespace().collect::<Vec<_>>().join(" AND ");
            KeywordQuery::FreeText(joined)
        };

        let (mut results, mut total) = self.keyword.search(&query, from, size).await?;

        if total == 0 && !identifier {
            if let Some(semantic) = &self.semantic {
                tracing::debug!("no lexical hits, running semantic fallback");

                let query_vector = semantic.embedding.embed_single(keyword).await?;
                let hits = semantic
                    .vector
                    .search(query_vector.len(), &query_vector, size.max(0) as usize)
                    .await?;

                let ids: Vec<Uuid> = hits.iter().map(|hit| hit.id).collect();
                results = self.keyword.search_by_ids(&ids).await?;
                total = results.len() as i64;
            }
        }

        Ok((results, total))
    }

    /// Ingests a batch of products.
    ///
    /// The keyword index write is the transaction boundary: it must succeed
    /// or the whole call fails. The vector path (embed, ensure collection,
    /// upsert) runs afterwards and is best-effort; its failure leaves the
    /// batch lexical-only and is reported as a warning in the returned
    /// [`IngestReport`].
    #[instrument(skip(self, inputs), fields(batch_size = inputs.len()))]
    pub async fn batch_create(&self, inputs: Vec<CreateProduct>) -> ProductResult<IngestReport> {
        if inputs.is_empty() {
            return Err(ProductError::Validation("empty batch".to_string()));
        }

        for input in &inputs {
            input
                .validate()
                .map_err(|e| ProductError::Validation(e.to_string()))?;
        }

        let mut products: Vec<Product> = inputs.into_iter().map(Product::new).collect();

        self.keyword.bulk_upsert(&products).await?;
        let ingested = products.len();

        let mut vectorized = 0;
        let mut warning = None;
        if let Some(semantic) = &self.semantic {
            match vectorize(semantic, &mut products).await {
                Ok(count) => vectorized = count,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "vector path failed after lexical write, batch left lexical-only"
                    );
                    warning = Some(e.to_string());
                }
            }
        }

        Ok(IngestReport {
            ingested,
            vectorized,
            warning,
        })
    }

    /// Drops and recreates the keyword index. Destructive.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> ProductResult<()> {
        self.keyword.drop_and_recreate().await
    }

    /// Number of indexed products.
    pub async fn count(&self) -> ProductResult<i64> {
        self.keyword.count().await
    }
}

/// Embeds every record's description and upserts the resulting points.
///
/// Vectors are correlated to records by the provider's index field, never
/// by array position. Records the provider returned no vector for are
/// skipped (with a warning), not failed.
async fn vectorize(
    semantic: &SemanticBackend,
    products: &mut [Product],
) -> ProductResult<usize> {
    let descriptions: Vec<String> = products.iter().map(|p| p.description.clone()).collect();

    let batch = semantic.embedding.embed_batch(&descriptions).await?;
    tracing::info!(
        prompt_tokens = batch.usage.prompt_tokens,
        total_tokens = batch.usage.total_tokens,
        documents = products.len(),
        "embedding usage"
    );

    for entry in batch.data {
        match products.get_mut(entry.index) {
            Some(product) => product.vector = Some(entry.vector),
            None => {
                tracing::warn!(index = entry.index, "embedding index out of range, dropped");
            }
        }
    }

    let mut dim = None;
    let mut points = Vec::with_capacity(products.len());
    for product in products.iter() {
        let Some(vector) = &product.vector else {
            tracing::warn!(id = %product.id, "record has no embedding, skipped from vector index");
            continue;
        };

        let expected = *dim.get_or_insert(vector.len());
        if vector.len() != expected {
            tracing::warn!(
                id = %product.id,
                dim = vector.len(),
                expected,
                "embedding dimension mismatch, skipped from vector index"
            );
            continue;
        }

        points.push(VectorPoint {
            id: product.id,
            vector: vector.clone(),
        });
    }

    let Some(dim) = dim else {
        return Ok(0);
    };

    semantic.vector.ensure_collection(dim).await?;
    let count = points.len();
    semantic.vector.upsert(dim, points).await?;

    Ok(count)
}
