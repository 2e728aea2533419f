//! Trendstore - durable in-memory state for social analytics
//!
//! Provides the bounded state layer of a social-media analytics pipeline: a
//! TTL record cache with FIFO eviction and an approximate trending-hashtag
//! tracker. Each structure loads its prior state from a JSON snapshot at
//! construction and owns a background scheduler that keeps saving it on a
//! fixed interval.

pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod snapshot;
pub mod trending;

pub use cache::TtlCache;
pub use config::{CacheConfig, TrackerConfig};
pub use error::SnapshotError;
pub use snapshot::SnapshotScheduler;
pub use trending::TopKTracker;
