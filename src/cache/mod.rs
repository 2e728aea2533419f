//! Cache Module
//!
//! Provides bounded in-memory caching with TTL expiry on read, FIFO
//! eviction and snapshot persistence.

mod durable;
mod entry;
mod order;
mod stats;
mod store;


// Re-export public types
pub use durable::TtlCache;
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::CacheStore;
