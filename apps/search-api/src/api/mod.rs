//! App-level routes: liveness and readiness.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use axum_helpers::server::{health_router, run_health_checks, HealthCheckFuture};
use domain_products::KeywordIndex;

use crate::state::AppState;

/// `/health` (liveness) and `/ready` (readiness), mounted at the root.
pub fn routes(state: AppState) -> Router {
    health_router(state.config.app.clone()).merge(
        Router::new()
            .route("/ready", get(ready))
            .with_state(state),
    )
}

/// Readiness: both the rate-limit store and the keyword index must answer.
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let redis = state.redis.clone();
    let index = state.index.clone();

    let checks: Vec<(&str, HealthCheckFuture)> = vec![
        (
            "redis",
            Box::pin(async move {
                database::redis::check_health(&redis)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
        (
            "keyword_index",
            Box::pin(async move {
                index.count().await.map(|_| ()).map_err(|e| e.to_string())
            }),
        ),
    ];

    run_health_checks(checks).await
}
