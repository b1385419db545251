//! Shared Cache State
//!
//! The entry store and its statistics live behind a single lock shared by the
//! cache handle and the background cleanup task.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheStats, EntryStore};

/// Lock-protected state shared between `Cache` and `CleanupScheduler`.
pub type SharedState<K, V> = Arc<Mutex<CacheState<K, V>>>;

// == Cache State ==
/// Entry storage plus the counters that describe it.
#[derive(Debug)]
pub struct CacheState<K, V> {
    pub store: EntryStore<K, V>,
    pub stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(max_size: usize) -> Self {
        Self {
            store: EntryStore::new(max_size),
            stats: CacheStats::new(),
        }
    }

    pub fn shared(max_size: usize) -> SharedState<K, V> {
        Arc::new(Mutex::new(Self::new(max_size)))
    }

    // == Enforce Capacity ==
    /// Evicts down to capacity and records the evictions.
    pub fn enforce_capacity(&mut self) -> usize {
        let evicted = self.store.enforce_capacity().len();
        self.stats.record_evictions(evicted);
        evicted
    }

    // == Purge Expired ==
    /// Removes expired entries and records the expirations.
    pub fn purge_expired(&mut self) -> usize {
        let expired = self.store.purge_expired();
        self.stats.record_expirations(expired);
        expired
    }
}
