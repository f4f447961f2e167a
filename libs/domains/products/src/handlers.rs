//! HTTP handlers for the product search API.
//!
//! The query endpoint runs three rate-limit gates per request, in order:
//! access (before the query string is even parsed), input (on the parsed
//! parameters) and output (on the response payload). Denial at any gate is
//! a 403; a missing API key never reaches the first gate and is a 401.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use axum_helpers::AppError;
use ratelimit::{Aspect, Limiter};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::limit_error_to_app;
use crate::models::{CreateProduct, IngestReport, Product, SearchParams, SearchResponse};
use crate::repository::KeywordIndex;
use crate::service::ProductService;

pub const API_KEY_HEADER: &str = "X-Newaim-Api-Key";

/// OpenAPI documentation for the search API
#[derive(OpenApi)]
#[openapi(
    paths(query_products, batch_create_products),
    components(schemas(Product, SearchParams, SearchResponse, CreateProduct, IngestReport)),
    tags(
        (name = "Products", description = "Product search and ingestion")
    )
)]
pub struct ApiDoc;

pub struct SearchState<R: KeywordIndex> {
    pub service: ProductService<R>,
    pub limiter: Limiter,
}

/// Builds the products router.
pub fn router<R: KeywordIndex + 'static>(service: ProductService<R>, limiter: Limiter) -> Router {
    let state = Arc::new(SearchState { service, limiter });

    Router::new()
        .route("/product", get(query_products))
        .route("/product/batch", post(batch_create_products))
        .with_state(state)
}

fn extract_api_key(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::Unauthorized("auth fail".to_string()))
}

/// Search products by keyword
#[utoipa::path(
    get,
    path = "/product",
    tag = "Products",
    params(SearchParams),
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Malformed parameters"),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Rate limit exceeded"),
        (status = 500, description = "Search backend failure")
    )
)]
async fn query_products<R: KeywordIndex>(
    State(state): State<Arc<SearchState<R>>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<SearchResponse>, AppError> {
    let api_key = extract_api_key(&headers)?;

    // Access gate first: parameter parsing happens only for admitted callers.
    state
        .limiter
        .check_access(api_key)
        .await
        .map_err(limit_error_to_app)?;

    let Query(mut params): Query<SearchParams> = Query::try_from_uri(&uri)?;
    params.keyword = params.keyword.trim().to_string();
    params.validate()?;

    state
        .limiter
        .check(Aspect::Input, api_key, Some(&params))
        .await
        .map_err(limit_error_to_app)?;

    let (data, total) = state
        .service
        .query(&params.keyword, params.from, params.size)
        .await?;

    state
        .limiter
        .check(Aspect::Output, api_key, Some(&data))
        .await
        .map_err(limit_error_to_app)?;

    Ok(Json(SearchResponse { total, data }))
}

/// Ingest a batch of products
#[utoipa::path(
    post,
    path = "/product/batch",
    tag = "Products",
    request_body = Vec<CreateProduct>,
    responses(
        (status = 201, description = "Batch ingested", body = IngestReport),
        (status = 400, description = "Invalid batch"),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Rate limit exceeded"),
        (status = 500, description = "Index failure")
    )
)]
async fn batch_create_products<R: KeywordIndex>(
    State(state): State<Arc<SearchState<R>>>,
    headers: HeaderMap,
    Json(inputs): Json<Vec<CreateProduct>>,
) -> Result<(StatusCode, Json<IngestReport>), AppError> {
    let api_key = extract_api_key(&headers)?;

    state
        .limiter
        .check_access(api_key)
        .await
        .map_err(limit_error_to_app)?;

    let report = state.service.batch_create(inputs).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use crate::repository::MockKeywordIndex;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use ratelimit::CounterStore;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// In-process counter store so limiter behavior is real in these tests.
    #[derive(Default)]
    struct MemoryCounterStore {
        counts: Mutex<HashMap<String, i64>>,
    }

    #[async_trait]
    impl CounterStore for MemoryCounterStore {
        async fn incr_with_window(
            &self,
            key: &str,
            _window_secs: u64,
        ) -> Result<i64, redis::RedisError> {
            let mut counts = self.counts.lock().unwrap();
            let entry = counts.entry(key.to_string()).or_insert(0);
            *entry += 1;
            Ok(*entry)
        }

        async fn set_value(
            &self,
            key: &str,
            value: i64,
            _ttl: Option<u64>,
        ) -> Result<(), redis::RedisError> {
            self.counts
                .lock()
                .unwrap()
                .insert(key.to_string(), value);
            Ok(())
        }
    }

    fn test_router(index: MockKeywordIndex) -> Router {
        let limiter = Limiter::new(Arc::new(MemoryCounterStore::default()));
        router(ProductService::new(index), limiter)
    }

    fn get_request(uri: &str, api_key: Option<&str>) -> http::Request<axum::body::Body> {
        let mut builder = http::Request::builder().method("GET").uri(uri);
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    fn sample_product(sku: &str) -> crate::models::Product {
        crate::models::Product::new(CreateProduct {
            sku: sku.to_string(),
            title: format!("{sku} title"),
            description: format!("{sku} description"),
        })
    }

    #[tokio::test]
    async fn test_missing_api_key_is_401() {
        let app = test_router(MockKeywordIndex::new());
        let response = app
            .oneshot(get_request("/product?keyword=mouse", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_query_returns_total_and_data_envelope() {
        let mut index = MockKeywordIndex::new();
        index
            .expect_search()
            .returning(|_, _, _| Ok((vec![sample_product("SKU-1")], 1)));

        let app = test_router(index);
        let response = app
            .oneshot(get_request("/product?keyword=MOUSE", Some("key-1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["total"], 1);
        assert_eq!(json["data"][0]["sku"], "SKU-1");
        assert!(json["data"][0].get("vector").is_none());
    }

    #[tokio::test]
    async fn test_negative_from_is_400() {
        let app = test_router(MockKeywordIndex::new());
        let response = app
            .oneshot(get_request("/product?keyword=MOUSE&from=-1", Some("key-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_page_is_400() {
        let app = test_router(MockKeywordIndex::new());
        let response = app
            .oneshot(get_request("/product?keyword=MOUSE&size=101", Some("key-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_access_limit_denial_is_403() {
        let mut index = MockKeywordIndex::new();
        index
            .expect_search()
            .returning(|_, _, _| Ok((vec![], 0)));

        let app = test_router(index);
        let limit = Aspect::Access.rule().limit;

        // Burn the whole access budget, then one more.
        for _ in 0..limit {
            let response = app
                .clone()
                .oneshot(get_request("/product?keyword=MOUSE", Some("key-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(get_request("/product?keyword=MOUSE", Some("key-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_access_gate_runs_before_parameter_binding() {
        let app = test_router(MockKeywordIndex::new());
        let limit = Aspect::Access.rule().limit;

        for _ in 0..limit {
            // Malformed parameters, rejected after the access gate.
            let response = app
                .clone()
                .oneshot(get_request("/product?from=-1", Some("key-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        // Budget exhausted: the denial outranks the binding error now.
        let response = app
            .oneshot(get_request("/product?from=-1", Some("key-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_keyword_is_trimmed_before_search() {
        let mut index = MockKeywordIndex::new();
        index
            .expect_search()
            .withf(|query, _, _| {
                *query == crate::repository::KeywordQuery::Sku("MOUSE".to_string())
            })
            .times(1)
            .returning(|_, _, _| Ok((vec![], 0)));

        let app = test_router(index);
        let response = app
            .oneshot(get_request("/product?keyword=%20MOUSE%20", Some("key-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_batch_ingest_returns_report() {
        let mut index = MockKeywordIndex::new();
        index.expect_bulk_upsert().times(1).returning(|_| Ok(()));

        let app = test_router(index);
        let body = serde_json::json!([
            { "sku": "SKU-1", "title": "Wireless mouse", "description": "A mouse" }
        ]);

        let request = http::Request::builder()
            .method("POST")
            .uri("/product/batch")
            .header(API_KEY_HEADER, "key-1")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ingested"], 1);
        assert_eq!(json["vectorized"], 0);
    }

    #[tokio::test]
    async fn test_batch_ingest_requires_api_key() {
        let app = test_router(MockKeywordIndex::new());
        let request = http::Request::builder()
            .method("POST")
            .uri("/product/batch")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from("[]"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
