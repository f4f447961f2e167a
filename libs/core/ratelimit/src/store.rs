use async_trait::async_trait;
use redis::aio::ConnectionManager;

/// Backend for the limiter's counters.
///
/// Both operations must be safe under concurrent callers hitting the same
/// key; the Redis implementation keeps them atomic server-side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments `key` and returns the new value. When the increment
    /// creates the key, a `window_secs` expiry is attached in the same
    /// atomic step, so a counter can never exist without a deadline
    /// (unless pinned via [`set_value`](CounterStore::set_value)).
    async fn incr_with_window(&self, key: &str, window_secs: u64) -> Result<i64, redis::RedisError>;

    /// Overwrites `key` with `value`. `ttl: None` removes any expiry,
    /// making the value permanent.
    async fn set_value(
        &self,
        key: &str,
        value: i64,
        ttl: Option<u64>,
    ) -> Result<(), redis::RedisError>;
}

/// INCR and EXPIRE must land together or a counter created just before a
/// crash would never expire.
const INCR_WITH_WINDOW_SCRIPT: &str = r#"
local v = redis.call('INCR', KEYS[1])
if v == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return v
"#;

pub struct RedisCounterStore {
    conn: ConnectionManager,
    script: redis::Script,
}

impl RedisCounterStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            script: redis::Script::new(INCR_WITH_WINDOW_SCRIPT),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_with_window(&self, key: &str, window_secs: u64) -> Result<i64, redis::RedisError> {
        let mut conn = self.conn.clone();
        self.script
            .key(key)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await
    }

    async fn set_value(
        &self,
        key: &str,
        value: i64,
        ttl: Option<u64>,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(secs) => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(secs)
                    .query_async::<()>(&mut conn)
                    .await
            }
            None => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .query_async::<()>(&mut conn)
                    .await
            }
        }
    }
}
