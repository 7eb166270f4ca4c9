//! Secondary indexes
//!
//! An index maps a single integer search key to the set of block numbers
//! holding at least one live record with that key. Membership is tracked at
//! block granularity, not record granularity: a lookup hit still requires
//! scanning the named blocks for the matching records. Duplicate search keys
//! are allowed (the search key is not a superkey), but duplicate
//! (key, block) pairs are not.
//!
//! Two strategies satisfy the same contract with different asymptotic
//! profiles:
//! - [`OrderedIndex`]: sorted array + binary search, O(log n) lookups
//! - [`HashIndex`]: hash table, average O(1) lookups
//!
//! The engine keeps at most one index per schema field, modeled as
//! `Option<FieldIndex>` with explicit dispatch.

mod hash;
mod ordered;

pub use hash::HashIndex;
pub use ordered::OrderedIndex;

/// An installed per-field index, tagged by strategy
#[derive(Debug)]
pub enum FieldIndex {
    Ordered(OrderedIndex),
    Hash(HashIndex),
}

impl FieldIndex {
    /// Block numbers associated with `key` (empty if absent, no duplicates)
    pub fn lookup(&self, key: i32) -> Vec<u32> {
        match self {
            FieldIndex::Ordered(idx) => idx.lookup(key),
            FieldIndex::Hash(idx) => idx.lookup(key),
        }
    }

    /// Insert the (key, block) pair; idempotent if already present
    pub fn insert(&mut self, key: i32, block: u32) {
        match self {
            FieldIndex::Ordered(idx) => idx.insert(key, block),
            FieldIndex::Hash(idx) => idx.insert(key, block),
        }
    }

    /// Remove the (key, block) pair; no-op if absent
    pub fn delete(&mut self, key: i32, block: u32) {
        match self {
            FieldIndex::Ordered(idx) => idx.delete(key, block),
            FieldIndex::Hash(idx) => idx.delete(key, block),
        }
    }

    /// Total number of (key, block) pairs
    pub fn len(&self) -> usize {
        match self {
            FieldIndex::Ordered(idx) => idx.len(),
            FieldIndex::Hash(idx) => idx.len(),
        }
    }

    /// True if the index holds no pairs
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
