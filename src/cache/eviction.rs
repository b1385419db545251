//! Eviction Module
//!
//! Chooses victims when the store holds more entries than its capacity.
//!
//! Victims are the entries with the fewest hits; among equally-used entries the
//! oldest one goes first. Selection is a full scan, which is fine for the small
//! capacities this cache is meant for.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::cache::CacheEntry;

// == Select Victim ==
/// Returns the key of the next entry to evict, or None if there are no entries.
pub fn select_victim<K, V>(entries: &HashMap<K, CacheEntry<V>>) -> Option<K>
where
    K: Eq + Hash + Clone,
{
    entries
        .iter()
        .min_by_key(|(_, entry)| entry.eviction_rank())
        .map(|(key, _)| key.clone())
}

// == Evict Until Within Capacity ==
/// Removes victims one at a time until at most `max_size` entries remain.
///
/// Returns the evicted keys in eviction order.
pub fn evict_until_within_capacity<K, V>(
    entries: &mut HashMap<K, CacheEntry<V>>,
    max_size: usize,
) -> Vec<K>
where
    K: Eq + Hash + Clone,
{
    let mut evicted = Vec::with_capacity(entries.len().saturating_sub(max_size));

    while entries.len() > max_size {
        let Some(victim) = select_victim(entries) else {
            break;
        };
        if let Some(entry) = entries.remove(&victim) {
            debug!(hit_count = entry.hit_count, "Evicted cache entry");
        }
        evicted.push(victim);
    }

    evicted
}
