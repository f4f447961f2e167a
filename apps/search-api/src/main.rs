//! Search API - hybrid product search server

use std::sync::Arc;
use std::time::Duration;

use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::redis::connect_with_retry;
use database::RetryConfig;
use domain_products::embedding::OpenAIProvider;
use domain_products::{
    handlers, ElasticKeywordIndex, ProductService, QdrantVectorStore,
};
use ratelimit::{Limiter, RedisCounterStore};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to Redis at {}", config.redis.url);
    let redis = connect_with_retry(&config.redis, &RetryConfig::default()).await?;
    let limiter = Limiter::new(Arc::new(RedisCounterStore::new(redis.clone())));

    let index = ElasticKeywordIndex::new(config.elastic.clone());

    let mut service = ProductService::new(index.clone());
    if let Some(semantic) = &config.semantic {
        info!("Semantic fallback enabled (qdrant at {})", semantic.qdrant.url);
        let vector_store = QdrantVectorStore::new(semantic.qdrant.clone())?;
        let provider = OpenAIProvider::new(semantic.openai.clone());
        service = service.with_semantic(Arc::new(vector_store), Arc::new(provider));
    } else {
        info!("Semantic fallback disabled, running lexical-only");
    }

    // The host decides what a failed bootstrap means: here, refuse to start.
    service.bootstrap().await?;

    if config.force_rebuild {
        info!("FORCE_REBUILD set, dropping and recreating the keyword index");
        service.rebuild().await?;
    }

    let product_count = service.count().await?;
    info!(product_count, "keyword index ready");

    let state = AppState {
        config: config.clone(),
        redis,
        index,
    };

    let api_routes = handlers::router(service, limiter);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(api::routes(state.clone()));

    info!("Starting Search API on port {}", config.server.port);

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: releasing Redis connection");
        drop(state.redis);
    })
    .await?;

    info!("Search API shutdown complete");
    Ok(())
}
