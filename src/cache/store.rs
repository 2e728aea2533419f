//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO insertion-order
//! eviction and TTL expiry on read.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};

// == Cache Store ==
/// Bounded key-value store with FIFO eviction and a cache-wide TTL.
///
/// This is the single-threaded engine; [`TtlCache`](crate::cache::TtlCache)
/// wraps it with locking and snapshot persistence. Lookups never fail:
/// absence and expiry are normal outcomes for a cache, reported as `None`.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Insertion-order tracker for FIFO eviction
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of live entries allowed
    max_size: usize,
    /// Entry time-to-live in seconds
    ttl_secs: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and TTL.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the store can hold
    /// * `ttl_secs` - TTL in seconds applied to every entry
    pub fn new(max_size: usize, ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_size,
            ttl_secs,
        }
    }

    // == Get ==
    /// Retrieves the value for `key` if present and not expired.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    /// Reads never refresh an entry's eviction position; only `put` does.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            // Check if expired
            if entry.is_expired(self.ttl_secs) {
                debug!("{} expired in cache", key);
                self.entries.remove(key);
                self.order.remove(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            Some(value)
        } else {
            debug!("{} not found in cache", key);
            self.stats.record_miss();
            None
        }
    }

    // == Put ==
    /// Inserts `value` under `key` as the newest entry.
    ///
    /// A put for an existing key discards the old entry and re-inserts at
    /// the newest position, resetting both its timestamp and its eviction
    /// order. If the store then exceeds `max_size`, the single
    /// oldest-inserted entry is evicted.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The value to store
    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.order.record(&key);

        // Insert first, then evict at most one
        if self.entries.len() > self.max_size {
            if let Some(oldest) = self.order.pop_oldest() {
                debug!("Cache full, evicting oldest entry: {}", oldest);
                self.entries.remove(&oldest);
                self.stats.record_eviction();
            }
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Snapshot Entries ==
    /// Exports the live entry set, oldest insertion first.
    ///
    /// The pairs preserve insertion order so a restored store evicts in the
    /// same order as the one that was saved.
    pub fn snapshot_entries(&self) -> Vec<(String, CacheEntry)> {
        self.order
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.clone(), entry.clone()))
            })
            .collect()
    }

    // == Restore ==
    /// Replaces the store contents with previously exported entries.
    ///
    /// Entries are re-inserted oldest to newest with their original
    /// timestamps, so TTLs keep running across a restart. Anything beyond
    /// the capacity bound is dropped FIFO, which handles reloading a
    /// snapshot into a store configured smaller than the one that wrote it.
    pub fn restore(&mut self, entries: Vec<(String, CacheEntry)>) {
        self.entries.clear();
        self.order = InsertionOrder::new();

        for (key, entry) in entries {
            self.entries.insert(key.clone(), entry);
            self.order.record(&key);
            if self.entries.len() > self.max_size {
                if let Some(oldest) = self.order.pop_oldest() {
                    self.entries.remove(&oldest);
                }
            }
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
