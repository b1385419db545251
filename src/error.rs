//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absence of a key is never an error; lookups return `Option`/`bool` instead.
/// Errors raised by a fetcher passed to `Cache::get_cached_or_fetch` are
/// returned to the caller unchanged and never wrapped in this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A TTL of zero was supplied
    #[error("Invalid TTL: duration must be greater than zero")]
    InvalidTtl,

    /// The background cleanup task could not be spawned
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
