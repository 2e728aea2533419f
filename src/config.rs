//! Configuration Module
//!
//! Handles loading and managing component configuration from environment variables.

use std::env;

// == Cache Config ==
/// Configuration for a [`TtlCache`](crate::cache::TtlCache) instance.
///
/// All values can be configured via environment variables with sensible
/// defaults. The snapshot path is not part of the configuration: several
/// caches (records, authors) can share one configuration while each owns
/// its own snapshot file.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
    /// Seconds between background snapshots
    pub save_interval_secs: u64,
}

impl CacheConfig {
    /// Creates a CacheConfig by loading values from environment variables.
    ///
    /// A save interval of zero is rejected and replaced by the default; the
    /// snapshot scheduler needs a non-zero period.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum live entries (default: 1000)
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 300)
    /// - `CACHE_SAVE_INTERVAL_SECS` - Snapshot frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            save_interval_secs: env::var("CACHE_SAVE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(60),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl_secs: 300,
            save_interval_secs: 60,
        }
    }
}

// == Tracker Config ==
/// Configuration for a [`TopKTracker`](crate::trending::TopKTracker) instance.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum number of hashtags on the watchlist
    pub max_size: usize,
    /// Seconds between background snapshots
    pub save_interval_secs: u64,
}

impl TrackerConfig {
    /// Creates a TrackerConfig by loading values from environment variables.
    ///
    /// A save interval of zero is rejected and replaced by the default; the
    /// snapshot scheduler needs a non-zero period.
    ///
    /// # Environment Variables
    /// - `TRACKER_MAX_SIZE` - Watchlist capacity (default: 10)
    /// - `TRACKER_SAVE_INTERVAL_SECS` - Snapshot frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            max_size: env::var("TRACKER_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            save_interval_secs: env::var("TRACKER_SAVE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(60),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            save_interval_secs: 60,
        }
    }
}
