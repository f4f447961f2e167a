use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A catalog product as stored in the keyword index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier, assigned at ingestion. Never supplied by callers.
    pub id: Uuid,
    /// Business identifier. Not unique across catalog versions.
    pub sku: String,
    /// Display title
    pub title: String,
    /// Free-text description, also the embedding source
    pub description: String,
    /// Embedding vector; present only after the record has been vectorized.
    /// Never included in query responses.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vector: Option<Vec<f32>>,
    /// Ingestion timestamp
    pub create_time: DateTime<Utc>,
    /// Last modification timestamp
    pub update_time: DateTime<Utc>,
    /// Relevance score, populated on query results only. Not persisted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<f64>,
}

impl Product {
    /// Builds a fresh record from an ingestion DTO, assigning identity and
    /// timestamps.
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            sku: input.sku,
            title: input.title,
            description: input.description,
            vector: None,
            create_time: now,
            update_time: now,
            score: None,
        }
    }
}

/// DTO for ingesting a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for product search
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct SearchParams {
    /// Search keyword; uppercase-only keywords are treated as SKU lookups
    #[serde(default)]
    pub keyword: String,
    /// Result offset
    #[serde(default)]
    #[validate(range(min = 0))]
    pub from: i64,
    /// Page size
    #[serde(default = "default_size")]
    #[validate(range(min = 0, max = 100))]
    pub size: i64,
}

fn default_size() -> i64 {
    10
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            from: 0,
            size: default_size(),
        }
    }
}

/// Search response envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Total matching records (not the page size)
    pub total: i64,
    pub data: Vec<Product>,
}

/// Outcome of one ingestion batch.
///
/// The lexical write is all-or-nothing; the vector path is best-effort.
/// A batch that indexed but failed to vectorize reports a warning here
/// rather than failing the call.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestReport {
    /// Records written to the keyword index
    pub ingested: usize,
    /// Records whose vectors reached the vector index
    pub vectorized: usize,
    /// Set when the vector path failed after the lexical write succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
