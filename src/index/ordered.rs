//! Ordered index
//!
//! A sorted map from search key to a sorted set of unique block numbers,
//! maintained as a flat vector searched by binary search. Lookup and
//! maintenance are O(log n) in the number of distinct keys plus O(m) for
//! entry insertion/removal shifts.

/// One index entry: a key and the blocks holding records with that key
#[derive(Debug)]
struct IndexEntry {
    key: i32,
    /// Ascending, no duplicates, never empty while the entry exists
    blocks: Vec<u32>,
}

/// Sorted-array index over a single integer search key
#[derive(Debug, Default)]
pub struct OrderedIndex {
    /// Strictly ascending by `key`, no duplicate keys
    entries: Vec<IndexEntry>,
}

impl OrderedIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Block numbers associated with `key`, empty if the key is absent
    ///
    /// Returns a fresh collection; the stored entry is never exposed.
    pub fn lookup(&self, key: i32) -> Vec<u32> {
        match self.entries.binary_search_by_key(&key, |e| e.key) {
            Ok(i) => self.entries[i].blocks.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Insert the (key, block) pair, keeping entries sorted by key and each
    /// block set sorted and unique. Inserting a present pair has no effect.
    pub fn insert(&mut self, key: i32, block: u32) {
        match self.entries.binary_search_by_key(&key, |e| e.key) {
            Ok(i) => {
                let blocks = &mut self.entries[i].blocks;
                if let Err(pos) = blocks.binary_search(&block) {
                    blocks.insert(pos, block);
                }
            }
            Err(pos) => {
                // First block for this key; pos is the sort-preserving
                // insertion point, including one past the last entry.
                self.entries.insert(
                    pos,
                    IndexEntry {
                        key,
                        blocks: vec![block],
                    },
                );
            }
        }
    }

    /// Remove the (key, block) pair; no-op if either is absent. An entry
    /// whose block set empties is removed entirely.
    pub fn delete(&mut self, key: i32, block: u32) {
        if let Ok(i) = self.entries.binary_search_by_key(&key, |e| e.key) {
            let blocks = &mut self.entries[i].blocks;
            if let Ok(pos) = blocks.binary_search(&block) {
                blocks.remove(pos);
            }
            if blocks.is_empty() {
                self.entries.remove(i);
            }
        }
    }

    /// Total number of (key, block) pairs across all entries
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.blocks.len()).sum()
    }

    /// True if the index holds no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct keys, ascending (for diagnostics and invariant checks)
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|e| e.key)
    }
}
