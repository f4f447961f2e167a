//! Products Domain
//!
//! Hybrid product search: a lexical keyword index is the source of truth,
//! with an optional semantic (embedding + vector search) fallback for
//! free-text queries that come back empty.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, API-key auth, rate-limit gates
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Query classification, fallback, ingestion pipeline
//! └──────┬──────┘
//!        │
//! ┌──────▼─────────────────────────────┐
//! │ KeywordIndex │ VectorStore │       │  ← Collaborator traits
//! │ (Elastic)    │ (Qdrant)    │ OpenAI│
//! └────────────────────────────────────┘
//! ```

pub mod elastic;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;
pub mod vector;

pub use elastic::{ElasticConfig, ElasticKeywordIndex};
pub use embedding::{BatchEmbedding, EmbeddingProvider, EmbeddingUsage};
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{CreateProduct, IngestReport, Product, SearchParams, SearchResponse};
pub use qdrant::{QdrantConfig, QdrantVectorStore};
pub use repository::{KeywordIndex, KeywordQuery};
pub use service::ProductService;
pub use vector::{VectorHit, VectorPoint, VectorStore};
