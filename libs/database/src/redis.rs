//! Redis connector built on the multiplexed [`ConnectionManager`].
//!
//! The manager transparently reconnects, so a single clone-able handle is
//! shared across the app for the lifetime of the process.

use crate::common::{retry_with_backoff, DatabaseError, DatabaseResult, RetryConfig};
use redis::aio::ConnectionManager;

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "config")]
impl core_config::FromEnv for RedisConfig {
    fn from_env() -> Result<Self, core_config::ConfigError> {
        Ok(Self {
            url: core_config::env_or_default("REDIS_URL", "redis://127.0.0.1:6379"),
        })
    }
}

/// Connects to Redis and verifies the connection with a PING.
pub async fn connect(config: &RedisConfig) -> DatabaseResult<ConnectionManager> {
    let client = redis::Client::open(config.url.as_str())?;
    let mut manager = ConnectionManager::new(client).await?;

    redis::cmd("PING")
        .query_async::<()>(&mut manager)
        .await
        .map_err(|e| DatabaseError::Connection(format!("Redis PING failed: {e}")))?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}

/// Like [`connect`], but retries with backoff. Intended for startup, where
/// the Redis container may come up after the app.
pub async fn connect_with_retry(
    config: &RedisConfig,
    retry: &RetryConfig,
) -> DatabaseResult<ConnectionManager> {
    retry_with_backoff(retry, "Redis connection", || connect(config)).await
}

/// Readiness probe used by the `/ready` endpoint.
pub async fn check_health(manager: &ConnectionManager) -> DatabaseResult<()> {
    let mut conn = manager.clone();
    redis::cmd("PING").query_async::<()>(&mut conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_explicit_url() {
        let config = RedisConfig::new("redis://localhost:6380");
        assert_eq!(config.url, "redis://localhost:6380");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_from_env_default() {
        use core_config::FromEnv;
        temp_env::with_var_unset("REDIS_URL", || {
            let config = RedisConfig::from_env().unwrap();
            assert_eq!(config.url, "redis://127.0.0.1:6379");
        });
    }
}
