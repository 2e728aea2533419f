//! Bounded Heap Module
//!
//! An indexed binary min-heap over (hashtag, count) pairs: the watchlist
//! backing the tracker's approximate top-K view.

use std::cmp::Ordering;
use std::collections::HashMap;

// == Heap Slot ==
/// One tracked (key, count) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapSlot {
    key: String,
    count: u64,
}

impl HeapSlot {
    /// Min-heap priority: lower counts come out first; equal counts order
    /// by key descending, so a full drain followed by a reverse yields
    /// count-descending output with ties in ascending key order.
    fn precedes(&self, other: &HeapSlot) -> bool {
        match self.count.cmp(&other.count) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.key > other.key,
        }
    }
}

// == Bounded Min Heap ==
/// Indexed binary min-heap of keys and their counts.
///
/// A position map alongside the heap array gives constant-time membership
/// checks and logarithmic keyed updates on top of the usual push, pop and
/// peek. That combination is what lets the tracker refresh a tracked key
/// or replace the current minimum in one step.
///
/// The capacity bound lives in the caller's update policy; the heap itself
/// accepts any number of slots. Ordering is fully deterministic, ties
/// included.
#[derive(Debug, Clone, Default)]
pub struct BoundedMinHeap {
    /// Binary heap in array form
    slots: Vec<HeapSlot>,
    /// Key to slot position, kept in lockstep with `slots`
    index: HashMap<String, usize>,
}

impl BoundedMinHeap {
    // == Constructor ==
    /// Creates a new empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Contains ==
    /// Checks whether `key` is tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Count Of ==
    /// Returns the tracked count for `key`.
    #[allow(dead_code)]
    pub fn count_of(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&pos| self.slots[pos].count)
    }

    // == Peek ==
    /// Returns the minimum entry without removing it.
    pub fn peek(&self) -> Option<(&str, u64)> {
        self.slots.first().map(|slot| (slot.key.as_str(), slot.count))
    }

    // == Push ==
    /// Inserts a new key with its count.
    ///
    /// A key that is already tracked is updated in place instead; the heap
    /// never holds duplicate keys.
    pub fn push(&mut self, key: impl Into<String>, count: u64) {
        let key = key.into();
        if let Some(&pos) = self.index.get(&key) {
            self.reorder(pos, count);
            return;
        }

        let pos = self.slots.len();
        self.index.insert(key.clone(), pos);
        self.slots.push(HeapSlot { key, count });
        self.sift_up(pos);
    }

    // == Pop ==
    /// Removes and returns the minimum entry.
    ///
    /// Returns None if the heap is empty.
    pub fn pop(&mut self) -> Option<(String, u64)> {
        let last = self.slots.len().checked_sub(1)?;
        self.slots.swap(0, last);
        let slot = self.slots.pop()?;
        self.index.remove(&slot.key);

        if !self.slots.is_empty() {
            self.sync_index(0);
            self.sift_down(0);
        }

        Some((slot.key, slot.count))
    }

    // == Update ==
    /// Sets the tracked count for `key`, restoring heap order.
    ///
    /// Returns false if the key is not tracked.
    pub fn update(&mut self, key: &str, count: u64) -> bool {
        let Some(&pos) = self.index.get(key) else {
            return false;
        };
        self.reorder(pos, count);
        true
    }

    // == Entries ==
    /// Exports the slots in heap-array order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.slots
            .iter()
            .map(|slot| (slot.key.clone(), slot.count))
            .collect()
    }

    // == From Entries ==
    /// Rebuilds a heap from exported entries.
    ///
    /// Re-indexes and re-heapifies, so the input does not need to be a
    /// valid heap array; one that is (the normal save and reload case)
    /// comes back position-identical. Duplicate keys keep their first
    /// occurrence.
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        let mut heap = Self::default();
        for (key, count) in entries {
            if heap.index.contains_key(&key) {
                continue;
            }
            let pos = heap.slots.len();
            heap.index.insert(key.clone(), pos);
            heap.slots.push(HeapSlot { key, count });
        }

        // Floyd heapify over the lower half
        for pos in (0..heap.slots.len() / 2).rev() {
            heap.sift_down(pos);
        }
        heap
    }

    // == Sift Helpers ==
    /// Applies a new count at `pos` and moves the slot to a valid position.
    /// Raising a count can only push a slot down; lowering it, only up.
    fn reorder(&mut self, pos: usize, count: u64) {
        let old = self.slots[pos].count;
        self.slots[pos].count = count;
        match count.cmp(&old) {
            Ordering::Less => self.sift_up(pos),
            Ordering::Greater => self.sift_down(pos),
            Ordering::Equal => {}
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.slots[pos].precedes(&self.slots[parent]) {
                self.swap_slots(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < self.slots.len() && self.slots[left].precedes(&self.slots[smallest]) {
                smallest = left;
            }
            if right < self.slots.len() && self.slots[right].precedes(&self.slots[smallest]) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }

            self.swap_slots(pos, smallest);
            pos = smallest;
        }
    }

    /// Swaps two slots and fixes both index entries.
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.index.insert(self.slots[a].key.clone(), a);
        self.index.insert(self.slots[b].key.clone(), b);
    }

    /// Repoints the index entry for the slot sitting at `pos`.
    fn sync_index(&mut self, pos: usize) {
        self.index.insert(self.slots[pos].key.clone(), pos);
    }
}
