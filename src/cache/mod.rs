//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, hit-count based eviction
//! and hit/miss statistics.

mod entry;
mod eviction;
mod facade;
mod state;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Ttl};
pub use eviction::{evict_until_within_capacity, select_victim};
pub use facade::Cache;
pub use state::{CacheState, SharedState};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{EntryStore, Lookup};
