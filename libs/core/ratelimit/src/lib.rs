//! Content-aware sliding-window rate limiting.
//!
//! A request is throttled along up to three aspects: who is calling
//! ([`Aspect::Access`]), what they ask for ([`Aspect::Input`]) and what they
//! got back ([`Aspect::Output`]). Input and output counters are keyed by a
//! fingerprint of the payload, so repeating the same query burns the same
//! counter while distinct queries do not interfere.
//!
//! Callers that blow far past a limit are banned outright: the counter is
//! pinned above the threshold with no expiry, so it never slides back under.

mod aspect;
mod error;
mod fingerprint;
mod limiter;
mod store;

pub use aspect::{Aspect, AspectRule};
pub use error::RateLimitError;
pub use fingerprint::fingerprint;
pub use limiter::Limiter;
pub use store::{CounterStore, RedisCounterStore};
