//! Entry Store Module
//!
//! Authoritative key-to-entry storage with lazy TTL expiration. Capacity is
//! enforced on request through the eviction module.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tokio::time::Instant;

use crate::cache::{eviction, CacheEntry, Ttl};

// == Lookup ==
/// Outcome of looking a key up in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// A fresh entry was found
    Hit(V),
    /// No entry exists for the key
    Miss,
    /// An entry existed but had outlived its TTL and was removed
    Expired,
}

impl<V> Lookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }
}

// == Entry Store ==
/// Key-value storage with TTL support.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Maximum number of entries allowed after capacity enforcement
    max_size: usize,
    /// Sequence number handed to the next inserted entry
    next_seq: u64,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty store. `max_size` is expected to be validated already.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            next_seq: 0,
        }
    }

    // == Get ==
    /// Looks up a key, counting a hit on the entry when it is fresh.
    ///
    /// Expired entries are removed on the way out.
    pub fn get<Q>(&mut self, key: &Q) -> Lookup<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        if self.remove_if_expired(key) {
            return Lookup::Expired;
        }

        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.hit_count += 1;
                Lookup::Hit(entry.value.clone())
            }
            None => Lookup::Miss,
        }
    }

    // == Probe ==
    /// Same freshness check as `get` without touching the entry's hit count.
    pub fn probe<Q>(&mut self, key: &Q) -> Lookup<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.remove_if_expired(key) {
            Lookup::Expired
        } else if self.entries.contains_key(key) {
            Lookup::Hit(())
        } else {
            Lookup::Miss
        }
    }

    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).is_hit()
    }

    // == Peek ==
    /// Returns the raw entry without freshness checks or side effects.
    pub fn peek<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// The entry starts over with a new creation time and zero hits. Capacity
    /// is not enforced here; see `enforce_capacity`.
    pub fn set(&mut self, key: K, value: V, ttl: Ttl) {
        let entry = CacheEntry::new(value, ttl, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, entry);
    }

    // == Remove ==
    /// Removes an entry. Returns whether one was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Purge Expired ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Enforce Capacity ==
    /// Evicts entries until the store is within `max_size`.
    ///
    /// Returns the evicted keys in eviction order.
    pub fn enforce_capacity(&mut self) -> Vec<K> {
        eviction::evict_until_within_capacity(&mut self.entries, self.max_size)
    }

    pub fn is_over_capacity(&self) -> bool {
        self.entries.len() > self.max_size
    }

    // == Length ==
    /// Returns the current number of entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn remove_if_expired<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired());
        if expired {
            self.entries.remove(key);
        }
        expired
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ttl_secs(secs: u64) -> Ttl {
        Ttl::from_secs(secs).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store: EntryStore<String, String> = EntryStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = EntryStore::new(100);

        store.set("key1".to_string(), "value1".to_string(), ttl_secs(300));
        let value = store.get("key1");

        assert_eq!(value, Lookup::Hit("value1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek("key1").unwrap().hit_count, 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: EntryStore<String, String> = EntryStore::new(100);

        assert_eq!(store.get("nonexistent"), Lookup::Miss);
        assert!(!store.has("nonexistent"));
    }

    #[test]
    fn test_store_has_does_not_count_hits() {
        let mut store = EntryStore::new(100);
        store.set("key1", 1, ttl_secs(300));

        assert!(store.has("key1"));
        assert!(store.has("key1"));
        assert_eq!(store.peek("key1").unwrap().hit_count, 0);
    }

    #[test]
    fn test_store_remove() {
        let mut store = EntryStore::new(100);

        store.set("key1", "value1", ttl_secs(300));
        assert!(store.remove("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), Lookup::Miss);
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut store: EntryStore<&str, &str> = EntryStore::new(100);
        assert!(!store.remove("nonexistent"));
    }

    #[test]
    fn test_store_overwrite_resets_hit_count() {
        let mut store = EntryStore::new(100);

        store.set("key1", "value1", ttl_secs(300));
        store.get("key1");
        store.get("key1");
        assert_eq!(store.peek("key1").unwrap().hit_count, 2);

        store.set("key1", "value2", ttl_secs(300));
        assert_eq!(store.peek("key1").unwrap().hit_count, 0);
        assert_eq!(store.get("key1"), Lookup::Hit("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store = EntryStore::new(100);
        store.set(1, "a", ttl_secs(300));
        store.set(2, "b", ttl_secs(300));

        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration() {
        let mut store = EntryStore::new(100);

        store.set("key1", "value1", Ttl::from_millis(100).unwrap());
        assert!(store.get("key1").is_hit());

        tokio::time::advance(Duration::from_millis(101)).await;

        assert_eq!(store.get("key1"), Lookup::Expired);
        assert_eq!(store.len(), 0, "Expired entry should be removed on access");
        assert_eq!(store.get("key1"), Lookup::Miss);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_has_removes_expired() {
        let mut store = EntryStore::new(100);
        store.set("key1", "value1", Ttl::from_millis(100).unwrap());

        tokio::time::advance(Duration::from_millis(150)).await;

        assert_eq!(store.probe("key1"), Lookup::Expired);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_purge_expired() {
        let mut store = EntryStore::new(100);

        store.set("key1", "value1", ttl_secs(1));
        store.set("key2", "value2", ttl_secs(10));

        tokio::time::advance(Duration::from_millis(1100)).await;

        let removed = store.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_hit());
    }

    #[test]
    fn test_store_enforce_capacity() {
        let mut store = EntryStore::new(2);

        store.set("a", 1, ttl_secs(300));
        store.set("b", 2, ttl_secs(300));
        store.get("a");
        store.set("c", 3, ttl_secs(300));
        assert!(store.is_over_capacity());

        let evicted = store.enforce_capacity();
        assert_eq!(evicted, vec!["b"]);
        assert!(!store.is_over_capacity());
        assert!(store.has("a"));
        assert!(store.has("c"));
    }
}
