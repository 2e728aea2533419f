//! Error types for snapshot persistence
//!
//! Provides unified error handling using thiserror.

use std::path::{Path, PathBuf};

use thiserror::Error;

// == Snapshot Error Enum ==
/// Unified error type for snapshot load and save failures.
///
/// Foreground operations (`get`, `put`, `update`, `top_k`) never produce
/// these; they only surface from explicit `save` calls and snapshot loads.
/// Scheduled background saves log the error and retry on the next interval.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot file could not be read or written
    #[error("snapshot I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot contents could not be encoded or decoded
    #[error("snapshot serialization failed at {}: {source}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn serde(path: &Path, source: serde_json::Error) -> Self {
        Self::Serde {
            path: path.to_path_buf(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
