//! Cache Statistics Module
//!
//! Tracks cache effectiveness: hits, misses, evictions and expirations.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Cumulative counters for the life of a cache instance.
///
/// Only `Cache::get` (and the lookup inside `get_cached_or_fetch`) records
/// hits and misses. Evictions and expirations are counted separately and never
/// affect the hit rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful lookups
    pub total_hits: u64,
    /// Number of lookups that found no fresh entry
    pub total_misses: u64,
    /// Number of entries removed to satisfy capacity
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits + self.total_misses;
        if total == 0 {
            0.0
        } else {
            self.total_hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.total_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.total_misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Captures the counters together with the store's current size.
    pub fn snapshot(&self, size: usize, max_size: usize) -> StatsSnapshot {
        StatsSnapshot {
            size,
            max_size,
            hit_rate: self.hit_rate(),
            total_hits: self.total_hits,
            total_misses: self.total_misses,
            evictions: self.evictions,
            expirations: self.expirations,
            taken_at: Utc::now(),
        }
    }
}

// == Stats Snapshot ==
/// Read-only view of the cache statistics at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Entries currently held, including expired ones not yet swept
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// total_hits / (total_hits + total_misses), 0 without lookups
    pub hit_rate: f64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Wall-clock time the snapshot was taken
    pub taken_at: DateTime<Utc>,
}
