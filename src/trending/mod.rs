//! Trending Module
//!
//! Provides approximate top-K hashtag frequency tracking over an unbounded
//! stream, with snapshot persistence.

mod heap;
mod tracker;


// Re-export public types
pub use heap::BoundedMinHeap;
pub use tracker::{TopKTracker, TrackerState};
