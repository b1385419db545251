//! Cache Facade
//!
//! The public cache handle. Composes the entry store, the eviction policy,
//! the statistics and the background cleanup task behind one lock.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;

use tracing::debug;

use crate::cache::{CacheState, Lookup, SharedState, StatsSnapshot, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::CleanupScheduler;

// == Cache ==
/// In-process key-value cache with TTL expiration, capacity-bound eviction
/// and hit/miss statistics.
///
/// Constructing a cache starts its background cleanup task on the current
/// Tokio runtime; dropping the cache (or calling [`Cache::close`]) stops it.
/// Share a cache between tasks by wrapping it in an `Arc`.
///
/// # Example
/// ```no_run
/// use memo_cache::{Cache, CacheConfig};
///
/// # async fn example() -> memo_cache::error::Result<()> {
/// let cache: Cache<String, u64> = Cache::new(CacheConfig::default())?;
///
/// cache.set("answer".to_string(), 42, None);
/// assert_eq!(cache.get("answer"), Some(42));
///
/// let value = cache
///     .get_cached_or_fetch("slow".to_string(), || async { Ok::<_, std::io::Error>(7) }, None)
///     .await
///     .unwrap();
/// assert_eq!(value, 7);
/// # Ok(())
/// # }
/// ```
pub struct Cache<K, V> {
    state: SharedState<K, V>,
    config: CacheConfig,
    default_ttl: Ttl,
    cleanup: CleanupScheduler<K, V>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Validates the configuration and starts the cleanup task.
    ///
    /// Fails with `InvalidConfig` for zero settings and with `NoRuntime` when
    /// called outside a Tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let default_ttl = Ttl::new(config.default_ttl)?;

        let state = CacheState::shared(config.max_size);
        let mut cleanup = CleanupScheduler::new(state.clone(), config.cleanup_interval);
        cleanup.start()?;

        debug!(
            max_size = config.max_size,
            default_ttl_ms = config.default_ttl.as_millis() as u64,
            "Cache created"
        );

        Ok(Self {
            state,
            config,
            default_ttl,
            cleanup,
        })
    }

    // == Get ==
    /// Returns the value for a fresh entry, recording a hit or a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        match state.store.get(key) {
            Lookup::Hit(value) => {
                state.stats.record_hit();
                Some(value)
            }
            Lookup::Miss => {
                state.stats.record_miss();
                None
            }
            Lookup::Expired => {
                state.stats.record_miss();
                state.stats.record_expirations(1);
                None
            }
        }
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry, then evicts down to
    /// capacity. `None` uses the configured default TTL.
    ///
    /// The new entry itself is an eviction candidate like any other.
    pub fn set(&self, key: K, value: V, ttl: Option<Ttl>) {
        let ttl = ttl.unwrap_or(self.default_ttl);

        let mut state = self.state.lock();
        state.store.set(key, value, ttl);
        if state.store.is_over_capacity() {
            state.enforce_capacity();
        }
    }

    // == Invalidate ==
    /// Removes an entry if present.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().store.remove(key);
    }

    // == Clear ==
    /// Removes every entry and resets all statistics.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.store.clear();
        state.stats.reset();
    }

    // == Has ==
    /// Whether a fresh entry exists. Never affects hit counts or statistics
    /// other than removing an expired entry it runs into.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        match state.store.probe(key) {
            Lookup::Hit(()) => true,
            Lookup::Miss => false,
            Lookup::Expired => {
                state.stats.record_expirations(1);
                false
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock();
        state
            .stats
            .snapshot(state.store.len(), state.store.max_size())
    }

    // == Get Cached Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetcher`, stores its
    /// result and returns it.
    ///
    /// The fetcher runs without the cache lock held, so concurrent misses on
    /// the same key each run their own fetch and the last one to finish wins.
    /// A fetch error is returned unchanged and nothing is stored; the miss
    /// that triggered the fetch stays counted.
    pub async fn get_cached_or_fetch<F, Fut, E>(
        &self,
        key: K,
        fetcher: F,
        ttl: Option<Ttl>,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = fetcher().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    // == Purge Expired ==
    /// Runs eager expiration now instead of waiting for the next sweep.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.state.lock().purge_expired()
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().store.is_empty()
    }
}

impl<K, V> Cache<K, V> {
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup.is_running()
    }

    // == Close ==
    /// Stops the background cleanup task. Idempotent.
    ///
    /// The cache keeps serving requests afterwards; expired entries are then
    /// only removed lazily or through `purge_expired`.
    pub fn close(&mut self) {
        self.cleanup.stop();
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("cleanup_running", &self.cleanup.is_running())
            .finish()
    }
}
