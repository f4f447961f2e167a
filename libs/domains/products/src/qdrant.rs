//! Qdrant-backed [`VectorStore`].
//!
//! One collection per vector dimensionality, named `product_vector_{dim}`
//! and created lazily on first use.

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::vector::{VectorHit, VectorPoint, VectorStore};

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout_secs: 10,
        }
    }

    /// Reads `QDRANT_URL` and optional `QDRANT_API_KEY` from the environment.
    pub fn from_env() -> ProductResult<Self> {
        let url =
            std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string());
        let api_key = std::env::var("QDRANT_API_KEY").ok();
        Ok(Self {
            url,
            api_key,
            timeout_secs: 10,
        })
    }
}

pub struct QdrantVectorStore {
    client: Qdrant,
}

fn collection_name(dim: usize) -> String {
    format!("product_vector_{dim}")
}

/// True when a create-collection failure means a concurrent creator won the
/// race, in which case the collection is there and the caller proceeds.
fn creation_race(message: &str) -> bool {
    message.contains("already exists")
}

impl QdrantVectorStore {
    pub fn new(config: QdrantConfig) -> ProductResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }
        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| ProductError::Init(format!("failed to build qdrant client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, dim: usize) -> ProductResult<()> {
        let name = collection_name(dim);

        if self.client.collection_exists(&name).await? {
            return Ok(());
        }

        let result = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(&name)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(collection = %name, "created vector collection");
                Ok(())
            }
            Err(e) if creation_race(&e.to_string()) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, dim: usize, points: Vec<VectorPoint>) -> ProductResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let name = collection_name(dim);
        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| PointStruct::new(p.id.to_string(), p.vector, Payload::new()))
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&name, qdrant_points))
            .await?;

        Ok(())
    }

    async fn search(
        &self,
        dim: usize,
        vector: &[f32],
        top_k: usize,
    ) -> ProductResult<Vec<VectorHit>> {
        let name = collection_name(dim);

        let response = self
            .client
            .search_points(SearchPointsBuilder::new(&name, vector.to_vec(), top_k as u64))
            .await?;

        let mut hits = Vec::with_capacity(response.result.len());
        for point in response.result {
            let id = point
                .id
                .and_then(|id| id.point_id_options)
                .ok_or_else(|| ProductError::VectorIndex("hit without point id".to_string()))?;

            let id = match id {
                PointIdOptions::Uuid(uuid_str) => Uuid::parse_str(&uuid_str).map_err(|e| {
                    ProductError::VectorIndex(format!("invalid point id: {e}"))
                })?,
                PointIdOptions::Num(num) => Uuid::from_u128(num as u128),
            };

            hits.push(VectorHit {
                id,
                score: point.score,
            });
        }

        Ok(hits)
    }
}
