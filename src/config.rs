//! Configuration Module
//!
//! Handles cache configuration, its validation, and loading it from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Default TTL applied by `set` when no explicit TTL is given
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default maximum number of stored entries
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default period between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Hard cap on the number of stored entries
    pub max_size: usize,
    /// Period between background expiration/eviction sweeps
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Cleanup period in milliseconds (default: 60000)
    ///
    /// Values are not validated here; `Cache::new` rejects invalid ones.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl: env_var::<u64>("CACHE_DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            max_size: env_var("CACHE_MAX_SIZE").unwrap_or(defaults.max_size),
            cleanup_interval: env_var::<u64>("CACHE_CLEANUP_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    // == Validate ==
    /// Checks that every setting is strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

/// Reads and parses an environment variable, warning when it is set but unparsable.
fn env_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}
