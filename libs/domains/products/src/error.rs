use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use ratelimit::RateLimitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Keyword index error: {0}")]
    KeywordIndex(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            // Collaborator failures are opaque server errors to the caller.
            ProductError::KeywordIndex(msg)
            | ProductError::VectorIndex(msg)
            | ProductError::Embedding(msg)
            | ProductError::Config(msg)
            | ProductError::Init(msg)
            | ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<qdrant_client::QdrantError> for ProductError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        ProductError::VectorIndex(err.to_string())
    }
}

/// Rate-limit outcomes map to HTTP directly: a denial is the caller's
/// problem (403), a store or fingerprint failure is ours (500).
pub fn limit_error_to_app(err: RateLimitError) -> AppError {
    match err {
        RateLimitError::Denied { .. } => AppError::Forbidden("fetch forbidden".to_string()),
        RateLimitError::Store(e) => AppError::InternalServerError(e.to_string()),
        RateLimitError::Fingerprint(e) => AppError::InternalServerError(e.to_string()),
    }
}
