//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and the validated TTL type.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{CacheError, Result};

// == TTL ==
/// A time-to-live that is guaranteed to be greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(Duration);

impl Ttl {
    /// Creates a TTL, rejecting a zero duration.
    pub fn new(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            Err(CacheError::InvalidTtl)
        } else {
            Ok(Self(duration))
        }
    }

    pub fn from_secs(secs: u64) -> Result<Self> {
        Self::new(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Result<Self> {
        Self::new(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for Ttl {
    type Error = CacheError;

    fn try_from(duration: Duration) -> Result<Self> {
        Self::new(duration)
    }
}

impl From<Ttl> for Duration {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was written
    pub created_at: Instant,
    /// How long after `created_at` the entry stays fresh
    pub ttl: Ttl,
    /// Successful lookups since the entry was written
    pub hit_count: u64,
    /// Store-wide insertion sequence number, orders entries sharing an instant
    pub seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry stamped with the current time and zero hits.
    pub fn new(value: V, ttl: Ttl, seq: u64) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
            hit_count: 0,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry whose age is exactly its TTL is still fresh;
    /// it expires once the age strictly exceeds the TTL.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl.as_duration()
    }

    // == Time To Live ==
    /// Returns the remaining freshness window, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let age = Instant::now().saturating_duration_since(self.created_at);
        self.ttl.as_duration().saturating_sub(age)
    }

    // == Eviction Rank ==
    /// Key that orders eviction candidates: fewest hits first, then oldest.
    pub fn eviction_rank(&self) -> (u64, Instant, u64) {
        (self.hit_count, self.created_at, self.seq)
    }
}
