//! Hash index
//!
//! Contract-compatible with [`OrderedIndex`](super::OrderedIndex) but backed
//! by a hash table for average O(1) lookup and maintenance. Collision
//! handling is the standard library map's; per-key block sets use the same
//! sorted-unique representation as the ordered index so duplicate
//! suppression is identical.
//!
//! Range queries are not supported through this index.

use std::collections::HashMap;

/// Hash-table index over a single integer search key
#[derive(Debug, Default)]
pub struct HashIndex {
    /// Key → ascending unique block numbers; values are never empty
    buckets: HashMap<i32, Vec<u32>>,
}

impl HashIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Block numbers associated with `key`, empty if the key is absent
    pub fn lookup(&self, key: i32) -> Vec<u32> {
        self.buckets.get(&key).cloned().unwrap_or_default()
    }

    /// Insert the (key, block) pair; idempotent if already present
    pub fn insert(&mut self, key: i32, block: u32) {
        let blocks = self.buckets.entry(key).or_default();
        if let Err(pos) = blocks.binary_search(&block) {
            blocks.insert(pos, block);
        }
    }

    /// Remove the (key, block) pair; no-op if absent. A key whose block set
    /// empties is removed from the table.
    pub fn delete(&mut self, key: i32, block: u32) {
        if let Some(blocks) = self.buckets.get_mut(&key) {
            if let Ok(pos) = blocks.binary_search(&block) {
                blocks.remove(pos);
            }
            if blocks.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    /// Total number of (key, block) pairs
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    /// True if the index holds no pairs
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
