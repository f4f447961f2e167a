use crate::aspect::Aspect;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The caller exhausted the budget for this aspect.
    #[error("rate limit exceeded for {aspect} aspect")]
    Denied { aspect: Aspect },

    /// The counter backend failed; the request cannot be admitted.
    #[error("rate limit store error: {0}")]
    Store(#[from] redis::RedisError),

    /// The payload could not be serialized for fingerprinting.
    #[error("failed to fingerprint payload: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

impl RateLimitError {
    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitError::Denied { .. })
    }
}
