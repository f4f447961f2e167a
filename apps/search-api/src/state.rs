//! Application state management

use domain_products::ElasticKeywordIndex;
use redis::aio::ConnectionManager;

/// Shared application state for the readiness probes.
///
/// The domain router carries its own state; this one only holds the handles
/// the app itself needs at runtime.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub redis: ConnectionManager,
    pub index: ElasticKeywordIndex,
}
