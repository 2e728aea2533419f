//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cache entry: a JSON value plus its insertion time.
///
/// The TTL is a cache-wide setting, so the entry only records when it was
/// inserted; expiry is judged against the owning cache's TTL at read time.
/// Entries serialize as-is into snapshots, which preserves their original
/// insertion times across a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Insertion timestamp (Unix seconds, sub-second precision)
    pub inserted_at: f64,
    /// The stored value
    pub value: Value,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry timestamped now.
    pub fn new(value: Value) -> Self {
        Self {
            inserted_at: epoch_secs(),
            value,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_secs`.
    ///
    /// Boundary condition: an entry exactly `ttl_secs` old is still live.
    /// Expiry requires the elapsed time to strictly exceed the TTL.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        epoch_secs() > self.inserted_at + ttl_secs as f64
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in seconds, with sub-second precision.
pub(crate) fn epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs_f64()
}
