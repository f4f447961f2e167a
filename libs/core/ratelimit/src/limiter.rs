use crate::aspect::{Aspect, BAN_MULTIPLIER};
use crate::error::RateLimitError;
use crate::fingerprint::fingerprint;
use crate::store::CounterStore;
use serde::Serialize;
use std::sync::Arc;

/// Sliding-window limiter over a shared [`CounterStore`].
#[derive(Clone)]
pub struct Limiter {
    store: Arc<dyn CounterStore>,
}

impl Limiter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Admits or denies one hit on the caller's access budget.
    pub async fn check_access(&self, api_key: &str) -> Result<(), RateLimitError> {
        self.check::<()>(Aspect::Access, api_key, None).await
    }

    /// Admits or denies one hit on `aspect` for this caller.
    ///
    /// For [`Aspect::Input`] and [`Aspect::Output`] the counter key includes
    /// a fingerprint of `payload`, so only identical payloads share a
    /// budget. A caller who pushes a counter past 20x its limit is banned:
    /// the counter is rewritten without an expiry and every later hit on the
    /// same key is denied.
    pub async fn check<T: Serialize + Sync>(
        &self,
        aspect: Aspect,
        api_key: &str,
        payload: Option<&T>,
    ) -> Result<(), RateLimitError> {
        let suffix = match payload {
            Some(p) => Some(fingerprint(p)?),
            None => None,
        };
        let key = counter_key(aspect, api_key, suffix.as_deref());

        let rule = aspect.rule();
        let count = self.store.incr_with_window(&key, rule.window_secs).await?;

        if count > rule.limit {
            let ban_threshold = rule.limit * BAN_MULTIPLIER;
            if count > ban_threshold {
                // Pin the counter permanently so the window never resets.
                self.store.set_value(&key, ban_threshold, None).await?;
                tracing::warn!(
                    aspect = %aspect,
                    api_key,
                    count,
                    "caller banned for repeated limit abuse"
                );
            }
            tracing::info!(aspect = %aspect, api_key, count, limit = rule.limit, "rate limit denied");
            return Err(RateLimitError::Denied { aspect });
        }

        Ok(())
    }
}

fn counter_key(aspect: Aspect, api_key: &str, suffix: Option<&str>) -> String {
    // The access aspect carries no payload; its slot holds a fixed marker.
    // The format, prefix included, predates this service and must not
    // change or deployed counters would reset.
    format!(
        "newaim_product_service_apikey_{}_aspect_{}_{}_limit",
        api_key,
        aspect.tag(),
        suffix.unwrap_or("access")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockCounterStore;
    use mockall::predicate::{always, eq};
    use serde_json::json;

    fn redis_err() -> redis::RedisError {
        redis::RedisError::from((redis::ErrorKind::Io, "connection reset"))
    }

    #[tokio::test]
    async fn test_under_limit_is_admitted() {
        let mut store = MockCounterStore::new();
        store
            .expect_incr_with_window()
            .with(always(), eq(10u64))
            .returning(|_, _| Ok(10));

        let limiter = Limiter::new(Arc::new(store));
        limiter.check_access("key-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_over_limit_is_denied() {
        let mut store = MockCounterStore::new();
        store.expect_incr_with_window().returning(|_, _| Ok(11));

        let limiter = Limiter::new(Arc::new(store));
        let err = limiter.check_access("key-1").await.unwrap_err();
        assert!(matches!(err, RateLimitError::Denied { aspect: Aspect::Access }));
    }

    #[tokio::test]
    async fn test_far_over_limit_pins_counter() {
        let mut store = MockCounterStore::new();
        store.expect_incr_with_window().returning(|_, _| Ok(201));
        store
            .expect_set_value()
            .with(always(), eq(200i64), eq(None))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let limiter = Limiter::new(Arc::new(store));
        let err = limiter.check_access("key-1").await.unwrap_err();
        assert!(err.is_denied());
    }

    #[tokio::test]
    async fn test_at_ban_threshold_is_denied_without_pinning() {
        let mut store = MockCounterStore::new();
        store.expect_incr_with_window().returning(|_, _| Ok(200));
        // No expect_set_value: pinning at exactly 20x would re-arm a counter
        // that is already about to expire.

        let limiter = Limiter::new(Arc::new(store));
        let err = limiter.check_access("key-1").await.unwrap_err();
        assert!(err.is_denied());
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut store = MockCounterStore::new();
        store
            .expect_incr_with_window()
            .returning(|_, _| Err(redis_err()));

        let limiter = Limiter::new(Arc::new(store));
        let err = limiter.check_access("key-1").await.unwrap_err();
        assert!(matches!(err, RateLimitError::Store(_)));
    }

    #[tokio::test]
    async fn test_payload_fingerprint_reaches_key() {
        let mut store = MockCounterStore::new();
        let payload = json!({"keyword": "mouse"});
        let expected_suffix = fingerprint(&payload).unwrap();
        store
            .expect_incr_with_window()
            .withf(move |key, _| key.contains(&expected_suffix) && key.contains("_aspect_2_"))
            .returning(|_, _| Ok(1));

        let limiter = Limiter::new(Arc::new(store));
        limiter
            .check(Aspect::Input, "key-1", Some(&payload))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_aspects_use_distinct_keys() {
        let key_access = counter_key(Aspect::Access, "k", None);
        let key_input = counter_key(Aspect::Input, "k", Some("abc"));
        let key_output = counter_key(Aspect::Output, "k", Some("abc"));
        assert_ne!(key_access, key_input);
        assert_ne!(key_input, key_output);
    }

    #[tokio::test]
    async fn test_access_key_matches_deployed_format() {
        assert_eq!(
            counter_key(Aspect::Access, "key-1", None),
            "newaim_product_service_apikey_key-1_aspect_1_access_limit"
        );
    }
}
