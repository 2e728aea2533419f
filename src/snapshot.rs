//! Snapshot Persistence Module
//!
//! Disk persistence for the in-memory state layer: JSON snapshot read/write
//! helpers and a background scheduler that runs a save routine on a fixed
//! interval.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::error::{Result, SnapshotError};

// == Snapshot Files ==

/// Serializes `state` as JSON and writes it to `path`.
///
/// The bytes go to a `.tmp` sibling first and are renamed into place, so an
/// interrupted save leaves the previous snapshot intact. Missing parent
/// directories are created.
pub fn write_snapshot<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let json = serde_json::to_vec(state).map_err(|e| SnapshotError::serde(path, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SnapshotError::io(path, e))?;
        }
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, &json).map_err(|e| SnapshotError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| SnapshotError::io(path, e))?;
    debug!("Wrote snapshot to {} ({} bytes)", path.display(), json.len());
    Ok(())
}

/// Reads a JSON snapshot from `path`.
///
/// Returns `Ok(None)` when no snapshot file exists: a missing file is a
/// cold start, not an error.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::io(path, e)),
    };

    let state = serde_json::from_slice(&bytes).map_err(|e| SnapshotError::serde(path, e))?;
    Ok(Some(state))
}

/// Appends `.tmp` to the full file name, keeping the original extension.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// == Snapshot Scheduler ==

/// Save routine run by the scheduler.
pub type SaveFn = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Runs a save routine on a fixed interval on a background Tokio task.
///
/// Durability is decoupled from the mutation path: foreground calls never
/// wait for disk. A failed scheduled save is logged and retried on the next
/// interval. [`stop`](Self::stop) cancels future runs without saving;
/// [`shutdown`](Self::shutdown) additionally waits out any in-flight save
/// and performs one final save, so the last observable state is on disk
/// when it resolves.
///
/// Dropping the scheduler aborts the task without a final save. Only
/// `shutdown` guarantees durability.
pub struct SnapshotScheduler {
    handle: Option<JoinHandle<()>>,
    stop_tx: watch::Sender<bool>,
    save_fn: SaveFn,
}

impl SnapshotScheduler {
    // == Start ==
    /// Spawns the background save task.
    ///
    /// The first save runs one full `interval` after start; a zero interval
    /// is treated as one second. Must be called within a Tokio runtime.
    pub fn start<F>(interval: Duration, save_fn: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        // tokio::time::interval panics on a zero period
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        let save_fn: SaveFn = Arc::new(save_fn);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task_save = Arc::clone(&save_fn);

        let handle = tokio::spawn(async move {
            debug!("Starting snapshot task with interval of {:?}", interval);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The interval fires immediately once; the first save belongs a
            // full interval in the future.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = (task_save)() {
                            warn!("Scheduled snapshot failed, retrying next interval: {}", e);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            debug!("Snapshot task stopped");
        });

        Self {
            handle: Some(handle),
            stop_tx,
            save_fn,
        }
    }

    // == Stop ==
    /// Cancels future scheduled saves.
    ///
    /// A save already in flight finishes; no further ones start. Does not
    /// save on its own. Use [`shutdown`](Self::shutdown) for that.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    // == Shutdown ==
    /// Stops the scheduler and performs one final save.
    ///
    /// Waits for the background task to exit, and with it any save already
    /// in flight, before saving. The final snapshot is therefore always the
    /// last writer. Returns the final save's outcome.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Snapshot task failed: {}", e);
                }
            }
        }
        (self.save_fn)()
    }
}

impl Drop for SnapshotScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
