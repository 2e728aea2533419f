//! Trending Tracker Module
//!
//! Streaming approximate top-K hashtag tracking: an unbounded frequency map
//! paired with a bounded watchlist heap, snapshotted together periodically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::snapshot::{read_snapshot, write_snapshot, SnapshotScheduler};
use crate::trending::BoundedMinHeap;

// == Snapshot Format ==
/// On-disk form of a tracker snapshot.
///
/// The frequency map and the watchlist are saved jointly; restoring one
/// without the other would let the watchlist disagree with the counts.
#[derive(Debug, Serialize, Deserialize)]
struct TrackerSnapshot {
    /// When the snapshot was written
    saved_at: DateTime<Utc>,
    /// Cumulative counts for every hashtag ever seen
    frequency_map: HashMap<String, u64>,
    /// Watchlist slots in heap-array order
    heap: Vec<(String, u64)>,
}

// == Tracker State ==
/// The tracker engine: cumulative counts plus the bounded watchlist.
///
/// This is the single-threaded core; [`TopKTracker`] wraps it with locking
/// and snapshot persistence. The frequency map is never pruned, so a
/// hashtag keeps accumulating occurrences while off the watchlist and
/// re-enters it at its full cumulative count once that count beats the
/// current minimum.
#[derive(Debug)]
pub struct TrackerState {
    /// Cumulative per-hashtag counts, case-folded keys
    freq: HashMap<String, u64>,
    /// Watchlist of current leaders, at most `max_size` entries
    heap: BoundedMinHeap,
    /// Watchlist capacity
    max_size: usize,
}

impl TrackerState {
    // == Constructor ==
    /// Creates an empty tracker with the given watchlist capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            freq: HashMap::new(),
            heap: BoundedMinHeap::new(),
            max_size,
        }
    }

    // == Apply ==
    /// Counts one occurrence of `tag` and reconciles the watchlist.
    ///
    /// Tags are folded to lower case before counting, so "Rust" and "rust"
    /// are one hashtag. The watchlist admits the tag if it is already
    /// tracked, if there is room, or if its cumulative count strictly
    /// exceeds the current minimum; a tie never displaces an incumbent.
    pub fn apply(&mut self, tag: &str) {
        let tag = tag.to_lowercase();
        let counter = self.freq.entry(tag.clone()).or_insert(0);
        *counter += 1;
        let count = *counter;

        if self.heap.contains(&tag) {
            self.heap.update(&tag, count);
        } else if self.heap.len() < self.max_size {
            self.heap.push(tag, count);
        } else {
            let min_count = self.heap.peek().map(|(_, count)| count);
            if let Some(min_count) = min_count {
                if count > min_count {
                    self.heap.pop();
                    self.heap.push(tag, count);
                }
            }
        }
    }

    // == Top K ==
    /// Lists the watchlist in descending count order.
    ///
    /// Drains a throwaway copy of the heap, minimum first, then reverses.
    /// Live state is never mutated, so back-to-back calls return identical
    /// output. Equal counts list in ascending key order.
    pub fn top_k(&self) -> Vec<(String, u64)> {
        drain_descending(self.heap.clone())
    }

    // == Count ==
    /// Returns the cumulative count for `tag` (case-folded), whether or
    /// not it is on the watchlist. Never-seen tags count zero.
    pub fn count(&self, tag: &str) -> u64 {
        self.freq.get(&tag.to_lowercase()).copied().unwrap_or(0)
    }

    // == Tracked ==
    /// Returns the number of hashtags currently on the watchlist.
    pub fn tracked(&self) -> usize {
        self.heap.len()
    }

    // == Snapshot Parts ==
    /// Clones both structures for serialization.
    fn snapshot_parts(&self) -> (HashMap<String, u64>, Vec<(String, u64)>) {
        (self.freq.clone(), self.heap.entries())
    }

    // == Restore ==
    /// Replaces both structures with previously saved contents.
    fn restore(&mut self, freq: HashMap<String, u64>, heap: Vec<(String, u64)>) {
        self.freq = freq;
        self.heap = BoundedMinHeap::from_entries(heap);
    }
}

// == Top-K Tracker ==
/// Approximate top-K hashtag tracker with periodic snapshots.
///
/// `update` and `top_k` are synchronous and infallible. A background task
/// owned by the tracker saves the frequency map and watchlist jointly every
/// `save_interval_secs`, and [`shutdown`](Self::shutdown) performs one
/// final save. One live instance per snapshot path is assumed.
///
/// The top-K view is approximate in one direction only: a hashtag that
/// fell off the watchlist early keeps its true cumulative count and can
/// climb back, but the list between those moments may miss it.
///
/// Saves are serialized by a dedicated lock, so an explicit `save`
/// overlapping a scheduled one cannot corrupt the snapshot file.
pub struct TopKTracker {
    state: Arc<Mutex<TrackerState>>,
    path: PathBuf,
    save_lock: Arc<Mutex<()>>,
    scheduler: SnapshotScheduler,
}

impl TopKTracker {
    // == Open ==
    /// Opens a tracker backed by the snapshot file at `path`.
    ///
    /// Loads prior state if a snapshot exists. A missing file is a cold
    /// start; an unreadable or corrupt one is logged and ignored, also
    /// starting cold. Construction itself never fails. Must be called
    /// within a Tokio runtime, since it spawns the snapshot task.
    pub fn open(path: impl Into<PathBuf>, config: TrackerConfig) -> Self {
        let path = path.into();
        let mut state = TrackerState::new(config.max_size);

        match read_snapshot::<TrackerSnapshot>(&path) {
            Ok(Some(snapshot)) => {
                debug!("Loading trending hashtags data from {}", path.display());
                state.restore(snapshot.frequency_map, snapshot.heap);
            }
            Ok(None) => {
                info!(
                    "Trending hashtags data not found at {}, starting empty",
                    path.display()
                );
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable tracker snapshot at {}: {}",
                    path.display(),
                    e
                );
            }
        }

        let state = Arc::new(Mutex::new(state));
        let save_lock = Arc::new(Mutex::new(()));
        let save_state = Arc::clone(&state);
        let task_lock = Arc::clone(&save_lock);
        let save_path = path.clone();
        let scheduler = SnapshotScheduler::start(
            Duration::from_secs(config.save_interval_secs),
            move || persist(&save_state, &task_lock, &save_path),
        );

        Self {
            state,
            path,
            save_lock,
            scheduler,
        }
    }

    // == Update ==
    /// Counts one occurrence of every hashtag in `hashtags`.
    ///
    /// The whole batch is applied under one lock acquisition, so a
    /// concurrent save sees either none or all of a record's hashtags.
    pub fn update<I, S>(&self, hashtags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.lock();
        for tag in hashtags {
            state.apply(tag.as_ref());
        }
    }

    // == Top K ==
    /// Returns the tracked hashtags in descending count order.
    pub fn top_k(&self) -> Vec<(String, u64)> {
        let scratch = self.state.lock().heap.clone();
        drain_descending(scratch)
    }

    // == Count ==
    /// Returns the cumulative count for a single hashtag (case-folded),
    /// whether or not it is on the watchlist.
    pub fn count(&self, tag: &str) -> u64 {
        self.state.lock().count(tag)
    }

    // == Tracked ==
    /// Returns the number of hashtags currently on the watchlist.
    pub fn tracked(&self) -> usize {
        self.state.lock().tracked()
    }

    // == Save ==
    /// Writes the frequency map and watchlist to the snapshot path.
    ///
    /// Same routine the background scheduler runs: both structures are
    /// copied under the lock and serialized after releasing it. Concurrent
    /// saves run one at a time; each writes a complete snapshot.
    pub fn save(&self) -> Result<()> {
        persist(&self.state, &self.save_lock, &self.path)
    }

    // == Shutdown ==
    /// Stops the snapshot scheduler and performs one final save.
    ///
    /// Resolves once the final snapshot is on disk. The tracker remains
    /// usable afterwards but is no longer saved in the background.
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down tracker backed by {}", self.path.display());
        self.scheduler.shutdown().await
    }
}

// == Helpers ==

/// Consumes a heap copy: pops everything minimum-first, then reverses into
/// descending count order.
fn drain_descending(mut heap: BoundedMinHeap) -> Vec<(String, u64)> {
    let mut top = Vec::with_capacity(heap.len());
    while let Some(entry) = heap.pop() {
        top.push(entry);
    }
    top.reverse();
    top
}

/// Copies both structures under the data lock, then serializes outside it.
///
/// The save lock is held for the whole routine: overlapping saves run one
/// at a time, so they never share the temp file and the newest copy is
/// always the last rename.
fn persist(state: &Mutex<TrackerState>, save_lock: &Mutex<()>, path: &Path) -> Result<()> {
    let _save_guard = save_lock.lock();
    let (frequency_map, heap) = state.lock().snapshot_parts();
    let snapshot = TrackerSnapshot {
        saved_at: Utc::now(),
        frequency_map,
        heap,
    };
    info!("Saving trending hashtags data to {}", path.display());
    write_snapshot(path, &snapshot)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(max_size: usize) -> TrackerConfig {
        TrackerConfig {
            max_size,
            save_interval_secs: 3600,
        }
    }

    #[test]
    fn test_state_case_folding() {
        let mut state = TrackerState::new(10);

        for tag in ["Rust", "rust", "RUST"] {
            state.apply(tag);
        }

        assert_eq!(state.top_k(), vec![("rust".to_string(), 3)]);
        assert_eq!(state.count("RuSt"), 3);
    }

    #[test]
    fn test_state_counts_accumulate() {
        let mut state = TrackerState::new(10);

        state.apply("rust");
        state.apply("rust");
        state.apply("python");

        assert_eq!(state.count("rust"), 2);
        assert_eq!(state.count("python"), 1);
        assert_eq!(state.count("never_seen"), 0);
    }

    #[test]
    fn test_state_watchlist_bounded() {
        let mut state = TrackerState::new(3);

        for tag in ["a", "b", "c", "d", "e", "f"] {
            state.apply(tag);
        }

        assert_eq!(state.tracked(), 3);
        assert!(state.top_k().len() <= 3);
    }

    #[test]
    fn test_state_tie_does_not_displace_incumbent() {
        let mut state = TrackerState::new(2);

        state.apply("a");
        state.apply("a");
        state.apply("b");
        // 'c' arrives with count 1, tying the minimum 'b'; 'b' stays
        state.apply("c");

        assert_eq!(
            state.top_k(),
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn test_state_strictly_greater_replaces_minimum() {
        let mut state = TrackerState::new(2);

        state.apply("a");
        state.apply("a");
        state.apply("b");
        state.apply("c");
        // Second 'c' reaches 2, strictly above 'b' at 1
        state.apply("c");

        assert_eq!(
            state.top_k(),
            vec![("a".to_string(), 2), ("c".to_string(), 2)]
        );
        // 'b' is off the watchlist but its count is intact
        assert_eq!(state.count("b"), 1);
    }

    #[test]
    fn test_state_untracked_tag_keeps_accumulating() {
        let mut state = TrackerState::new(1);

        state.apply("a");
        state.apply("a");
        // 'b' accumulates off the watchlist until it beats 'a'
        state.apply("b");
        state.apply("b");
        assert_eq!(state.top_k(), vec![("a".to_string(), 2)]);

        state.apply("b");
        assert_eq!(state.top_k(), vec![("b".to_string(), 3)]);
        assert_eq!(state.count("a"), 2);
    }

    #[test]
    fn test_state_top_k_is_idempotent() {
        let mut state = TrackerState::new(5);

        for tag in ["x", "y", "x", "z", "x", "y"] {
            state.apply(tag);
        }

        let first = state.top_k();
        let second = state.top_k();
        assert_eq!(first, second);
        assert_eq!(first[0], ("x".to_string(), 3));
    }

    #[test]
    fn test_state_top_k_orders_ties_ascending() {
        let mut state = TrackerState::new(5);

        for tag in ["mango", "apple", "kiwi"] {
            state.apply(tag);
        }

        assert_eq!(
            state.top_k(),
            vec![
                ("apple".to_string(), 1),
                ("kiwi".to_string(), 1),
                ("mango".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_state_empty_top_k() {
        let state = TrackerState::new(5);
        assert!(state.top_k().is_empty());
    }

    #[test]
    fn test_state_zero_capacity_still_counts() {
        let mut state = TrackerState::new(0);

        state.apply("a");
        state.apply("a");

        assert!(state.top_k().is_empty());
        assert_eq!(state.count("a"), 2);
    }

    #[test]
    fn test_state_restore_round_trip() {
        let mut state = TrackerState::new(3);
        for tag in ["a", "b", "a", "c", "a", "b"] {
            state.apply(tag);
        }

        let (freq, heap) = state.snapshot_parts();
        let mut restored = TrackerState::new(3);
        restored.restore(freq, heap);

        assert_eq!(restored.top_k(), state.top_k());
        assert_eq!(restored.count("a"), 3);
    }

    #[tokio::test]
    async fn test_tracker_cold_start() {
        let dir = TempDir::new().unwrap();
        let tracker = TopKTracker::open(dir.path().join("trending.json"), test_config(10));

        assert!(tracker.top_k().is_empty());
        assert_eq!(tracker.count("anything"), 0);
    }

    #[tokio::test]
    async fn test_tracker_update_and_top_k() {
        let dir = TempDir::new().unwrap();
        let tracker = TopKTracker::open(dir.path().join("trending.json"), test_config(10));

        tracker.update(vec!["Rust", "tokio", "rust"]);

        assert_eq!(tracker.count("rust"), 2);
        assert_eq!(
            tracker.top_k(),
            vec![("rust".to_string(), 2), ("tokio".to_string(), 1)]
        );
        assert_eq!(tracker.tracked(), 2);
    }

    #[tokio::test]
    async fn test_tracker_save_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trending.json");

        let tracker = TopKTracker::open(&path, test_config(2));
        tracker.update(vec!["a", "a", "b", "offlist"]);
        let before = tracker.top_k();
        tracker.save().unwrap();
        drop(tracker);

        let reopened = TopKTracker::open(&path, test_config(2));
        assert_eq!(reopened.top_k(), before);
        // Off-watchlist counts survive too
        assert_eq!(reopened.count("offlist"), 1);
    }

    #[tokio::test]
    async fn test_tracker_shutdown_saves_final_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trending.json");

        let mut tracker = TopKTracker::open(&path, test_config(10));
        tracker.update(vec!["kept"]);
        tracker.shutdown().await.unwrap();
        drop(tracker);

        let reopened = TopKTracker::open(&path, test_config(10));
        assert_eq!(reopened.top_k(), vec![("kept".to_string(), 1)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tracker_concurrent_saves_all_succeed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trending.json");
        let tracker = Arc::new(TopKTracker::open(&path, test_config(10)));
        tracker.update(vec!["rust"]);

        // Two threads hammering save() on one path: every call must write a
        // complete snapshot, none may trip over another's temp file
        let mut workers = Vec::new();
        for _ in 0..2 {
            let tracker = Arc::clone(&tracker);
            workers.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    tracker.save().expect("overlapping saves should all succeed");
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        let reopened = TopKTracker::open(&path, test_config(10));
        assert_eq!(reopened.count("rust"), 1);
    }

    #[tokio::test]
    async fn test_tracker_corrupt_snapshot_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trending.json");
        std::fs::write(&path, b"][ nope").unwrap();

        let tracker = TopKTracker::open(&path, test_config(10));
        assert!(tracker.top_k().is_empty());

        tracker.update(vec!["fresh"]);
        tracker.save().unwrap();
        drop(tracker);

        let reopened = TopKTracker::open(&path, test_config(10));
        assert_eq!(reopened.count("fresh"), 1);
    }
}
