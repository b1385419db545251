//! Memo Cache - an in-process memoization cache
//!
//! Generic key-value cache with TTL expiration, a bounded entry count with
//! hit-count based eviction, a background cleanup task and hit/miss statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, StatsSnapshot, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
