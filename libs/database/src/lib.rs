//! Database connectors and utilities for the workspace.
//!
//! Currently covers Redis, the only stateful store this workspace talks to
//! directly (the search indexes are reached over their own client APIs).

pub mod common;
#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
