//! Elasticsearch-backed [`KeywordIndex`] over the REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;
use crate::repository::{KeywordIndex, KeywordQuery};

const PRODUCT_INDEX: &str = "product_sku_index";

#[derive(Debug, Clone)]
pub struct ElasticConfig {
    pub url: String,
}

impl ElasticConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Reads `ELASTICSEARCH_URL` from the environment.
    pub fn from_env() -> ProductResult<Self> {
        let url = std::env::var("ELASTICSEARCH_URL")
            .unwrap_or_else(|_| "http://localhost:9200".to_string());
        Ok(Self { url })
    }
}

#[derive(Clone)]
pub struct ElasticKeywordIndex {
    client: Client,
    base_url: String,
}

/// Exact-match fields are `keyword`-typed; only title and description are
/// analyzed for full-text matching.
fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "sku": { "type": "keyword" },
                "title": { "type": "text" },
                "description": { "type": "text" },
                "createTime": {
                    "type": "date",
                    "format": "strict_date_optional_time||epoch_millis"
                },
                "updateTime": {
                    "type": "date",
                    "format": "strict_date_optional_time||epoch_millis"
                }
            }
        }
    })
}

fn search_body(query: &KeywordQuery, from: i64, size: i64) -> Value {
    let query_clause = match query {
        // Identifier lookups hit the keyword-typed sku field only.
        KeywordQuery::Sku(keyword) => json!({
            "bool": {
                "should": [
                    { "term": { "sku": keyword } }
                ]
            }
        }),
        KeywordQuery::FreeText(keyword) => json!({
            "bool": {
                "should": [
                    { "term": { "sku": keyword } },
                    { "match": { "title": keyword } },
                    { "match": { "description": keyword } }
                ]
            }
        }),
    };

    json!({
        "from": from,
        "size": size,
        "sort": [ { "_score": "desc" } ],
        "query": query_clause
    })
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    hits: EsHits,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    total: EsTotal,
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsTotal {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_source")]
    source: Product,
    #[serde(rename = "_score")]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EsCountResponse {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct EsBulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

impl ElasticKeywordIndex {
    pub fn new(config: ElasticConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, PRODUCT_INDEX)
    }

    async fn create_index(&self) -> ProductResult<()> {
        let response = self
            .client
            .put(self.index_url())
            .json(&index_mapping())
            .send()
            .await
            .map_err(es_error)?;

        check_response("create index", response).await?;
        tracing::info!(index = PRODUCT_INDEX, "created keyword index");
        Ok(())
    }

    async fn run_search(&self, body: Value) -> ProductResult<(Vec<Product>, i64)> {
        let response = self
            .client
            .post(format!("{}/_search?track_total_hits=true", self.index_url()))
            .json(&body)
            .send()
            .await
            .map_err(es_error)?;

        let response = check_response("search", response).await?;
        let parsed: EsSearchResponse = response.json().await.map_err(es_error)?;

        let total = parsed.hits.total.value;
        let products = parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let mut product = hit.source;
                product.score = hit.score;
                product
            })
            .collect();

        Ok((products, total))
    }
}

#[async_trait]
impl KeywordIndex for ElasticKeywordIndex {
    async fn ensure_index(&self) -> ProductResult<()> {
        let response = self
            .client
            .head(self.index_url())
            .send()
            .await
            .map_err(es_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => self.create_index().await,
            status if status.is_success() => Ok(()),
            status => Err(ProductError::KeywordIndex(format!(
                "index existence check failed ({status})"
            ))),
        }
    }

    async fn count(&self) -> ProductResult<i64> {
        let response = self
            .client
            .get(format!("{}/_count", self.index_url()))
            .send()
            .await
            .map_err(es_error)?;

        let response = check_response("count", response).await?;
        let parsed: EsCountResponse = response.json().await.map_err(es_error)?;
        Ok(parsed.count)
    }

    async fn bulk_upsert(&self, products: &[Product]) -> ProductResult<()> {
        if products.is_empty() {
            return Ok(());
        }

        let mut body = String::new();
        for product in products {
            let action = json!({ "index": { "_index": PRODUCT_INDEX, "_id": product.id } });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(product).map_err(|e| {
                ProductError::Internal(format!("failed to serialize product: {e}"))
            })?);
            body.push('\n');
        }

        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(es_error)?;

        let response = check_response("bulk upsert", response).await?;
        let parsed: EsBulkResponse = response.json().await.map_err(es_error)?;

        if parsed.errors {
            let reason = parsed
                .items
                .iter()
                .find_map(|item| item.pointer("/index/error/reason"))
                .and_then(Value::as_str)
                .unwrap_or("unknown bulk failure");
            return Err(ProductError::KeywordIndex(format!(
                "bulk upsert reported item errors: {reason}"
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        query: &KeywordQuery,
        from: i64,
        size: i64,
    ) -> ProductResult<(Vec<Product>, i64)> {
        self.run_search(search_body(query, from, size)).await
    }

    async fn search_by_ids(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let id_strings: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let body = json!({
            "from": 0,
            "size": ids.len(),
            "sort": [ { "_score": "desc" } ],
            "query": {
                "terms": { "id": id_strings }
            }
        });

        let (products, _) = self.run_search(body).await?;
        Ok(products)
    }

    async fn drop_and_recreate(&self) -> ProductResult<()> {
        let response = self
            .client
            .delete(self.index_url())
            .send()
            .await
            .map_err(es_error)?;

        // A missing index is fine; rebuild proceeds to creation.
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProductError::KeywordIndex(format!(
                "delete index failed ({status}): {text}"
            )));
        }

        self.create_index().await
    }
}

fn es_error(err: impl std::fmt::Display) -> ProductError {
    ProductError::KeywordIndex(err.to_string())
}

async fn check_response(
    operation: &str,
    response: reqwest::Response,
) -> ProductResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // Surface the index's own error reason when it sent one.
    let reason = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/reason")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or(body);

    Err(ProductError::KeywordIndex(format!(
        "{operation} failed ({status}): {reason}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_query_is_exact_term_only() {
        let body = search_body(&KeywordQuery::Sku("V539-NIK".to_string()), 0, 10);
        let should = body
            .pointer("/query/bool/should")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(should.len(), 1);
        assert_eq!(should[0].pointer("/term/sku").unwrap(), "V539-NIK");
    }

    #[test]
    fn test_free_text_query_spans_all_fields() {
        let body = search_body(&KeywordQuery::FreeText("running AND shoe".to_string()), 5, 20);
        let should = body
            .pointer("/query/bool/should")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(should.len(), 3);
        assert_eq!(should[1].pointer("/match/title").unwrap(), "running AND shoe");
        assert_eq!(
            should[2].pointer("/match/description").unwrap(),
            "running AND shoe"
        );
        assert_eq!(body["from"], 5);
        assert_eq!(body["size"], 20);
    }

    #[test]
    fn test_mapping_types() {
        let mapping = index_mapping();
        assert_eq!(
            mapping.pointer("/mappings/properties/sku/type").unwrap(),
            "keyword"
        );
        assert_eq!(
            mapping.pointer("/mappings/properties/title/type").unwrap(),
            "text"
        );
        assert_eq!(
            mapping.pointer("/mappings/properties/id/type").unwrap(),
            "keyword"
        );
    }
}
