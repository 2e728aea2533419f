//! Insertion Order Module
//!
//! Tracks key insertion order for FIFO cache eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks the order in which keys were inserted.
///
/// Keys are stored in a VecDeque where:
/// - Front = oldest insertion
/// - Back = newest insertion
///
/// Only writes move a key; reads never touch the order, so eviction is
/// strictly first-in-first-out by most recent put.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    /// Keys ordered oldest to newest
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty order tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Marks a key as the newest insertion (moves to back).
    ///
    /// If the key is already tracked it is removed first, so re-putting a
    /// key resets its eviction position.
    pub fn record(&mut self, key: &str) {
        // Remove existing occurrence
        self.remove(key);
        // Add to back (newest)
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest-inserted key.
    ///
    /// Returns None if the tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest-inserted key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Iter ==
    /// Iterates tracked keys oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
