//! Durable Cache Module
//!
//! Wraps the cache engine with locking and snapshot persistence: prior
//! state is loaded at construction and a private background scheduler keeps
//! saving the entry set on a fixed interval.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::snapshot::{read_snapshot, write_snapshot, SnapshotScheduler};

// == Snapshot Format ==
/// On-disk form of a cache snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    /// When the snapshot was written
    saved_at: DateTime<Utc>,
    /// Live entries, oldest insertion first
    entries: Vec<(String, CacheEntry)>,
}

// == TTL Cache ==
/// Bounded key-value cache with TTL expiry, FIFO eviction and periodic
/// snapshots.
///
/// `get` and `put` are synchronous and infallible; absence is a normal
/// result, never an error. A background task owned by the cache writes the
/// entry set to the snapshot path every `save_interval_secs`, and
/// [`shutdown`](Self::shutdown) performs one final save. One live instance
/// per snapshot path is assumed; two instances sharing a path would
/// overwrite each other's snapshots.
///
/// The handle is `Send + Sync`; clones of the inner state are taken under a
/// short-lived lock so foreground calls never wait on disk I/O. Saves
/// themselves are serialized by a dedicated lock, so an explicit `save`
/// overlapping a scheduled one cannot corrupt the snapshot file.
pub struct TtlCache {
    store: Arc<Mutex<CacheStore>>,
    path: PathBuf,
    save_lock: Arc<Mutex<()>>,
    scheduler: SnapshotScheduler,
}

impl TtlCache {
    // == Open ==
    /// Opens a cache backed by the snapshot file at `path`.
    ///
    /// Loads prior state if a snapshot exists. A missing file is a cold
    /// start; an unreadable or corrupt one is logged and ignored, also
    /// starting cold. Construction itself never fails. Must be called
    /// within a Tokio runtime, since it spawns the snapshot task.
    pub fn open(path: impl Into<PathBuf>, config: CacheConfig) -> Self {
        let path = path.into();
        let mut store = CacheStore::new(config.max_size, config.ttl_secs);

        match read_snapshot::<CacheSnapshot>(&path) {
            Ok(Some(snapshot)) => {
                debug!("Loading cache data from {}", path.display());
                store.restore(snapshot.entries);
            }
            Ok(None) => {
                info!("Cache data not found at {}, starting empty", path.display());
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable cache snapshot at {}: {}",
                    path.display(),
                    e
                );
            }
        }

        let store = Arc::new(Mutex::new(store));
        let save_lock = Arc::new(Mutex::new(()));
        let save_store = Arc::clone(&store);
        let task_lock = Arc::clone(&save_lock);
        let save_path = path.clone();
        let scheduler = SnapshotScheduler::start(
            Duration::from_secs(config.save_interval_secs),
            move || persist(&save_store, &task_lock, &save_path),
        );

        Self {
            store,
            path,
            save_lock,
            scheduler,
        }
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// Reads never refresh an entry's eviction position.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.lock().get(key)
    }

    // == Put ==
    /// Inserts `value` under `key` as the newest entry, evicting the
    /// oldest-inserted entry if the cache overflows.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.store.lock().put(key, value);
    }

    // == Save ==
    /// Writes the current entry set to the snapshot path.
    ///
    /// Same routine the background scheduler runs: the entry set is copied
    /// under the lock and serialized after releasing it. Concurrent saves
    /// run one at a time; each writes a complete snapshot.
    pub fn save(&self) -> Result<()> {
        persist(&self.store, &self.save_lock, &self.path)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    // == Shutdown ==
    /// Stops the snapshot scheduler and performs one final save.
    ///
    /// Resolves once the final snapshot is on disk. The cache remains
    /// usable afterwards but is no longer saved in the background.
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down cache backed by {}", self.path.display());
        self.scheduler.shutdown().await
    }
}

// == Persistence ==
/// Copies the entry set under the data lock, then serializes outside it.
///
/// The save lock is held for the whole routine: overlapping saves run one
/// at a time, so they never share the temp file and the newest copy is
/// always the last rename.
fn persist(store: &Mutex<CacheStore>, save_lock: &Mutex<()>, path: &Path) -> Result<()> {
    let _save_guard = save_lock.lock();
    let entries = store.lock().snapshot_entries();
    let snapshot = CacheSnapshot {
        saved_at: Utc::now(),
        entries,
    };
    info!("Saving cache data to {}", path.display());
    write_snapshot(path, &snapshot)
}
