//! Tests for the ordered and hash index implementations
//!
//! These tests verify:
//! - The shared lookup/insert/delete/len contract
//! - Duplicate (key, block) suppression
//! - Sort invariants of the ordered index under arbitrary op sequences
//! - Entry removal when a key's block set empties
//! - Contract parity between the two strategies

use heapstore::{FieldIndex, HashIndex, OrderedIndex};

// =============================================================================
// Ordered Index
// =============================================================================

#[test]
fn test_ordered_empty_lookup() {
    let idx = OrderedIndex::new();
    assert!(idx.lookup(42).is_empty());
    assert_eq!(idx.len(), 0);
    assert!(idx.is_empty());
}

#[test]
fn test_ordered_insert_and_lookup() {
    let mut idx = OrderedIndex::new();
    idx.insert(10, 2);
    idx.insert(10, 5);
    idx.insert(10, 3);

    assert_eq!(idx.lookup(10), vec![2, 3, 5]); // ascending, unique
    assert!(idx.lookup(11).is_empty());
    assert_eq!(idx.len(), 3);
}

#[test]
fn test_ordered_duplicate_pair_is_idempotent() {
    let mut idx = OrderedIndex::new();
    idx.insert(7, 4);
    idx.insert(7, 4);
    idx.insert(7, 4);

    assert_eq!(idx.lookup(7), vec![4]);
    assert_eq!(idx.len(), 1);
}

#[test]
fn test_ordered_insert_positions() {
    let mut idx = OrderedIndex::new();
    // Middle, front, back, and between existing keys
    idx.insert(50, 2);
    idx.insert(10, 2);
    idx.insert(90, 2);
    idx.insert(30, 2);
    idx.insert(70, 2);

    let keys: Vec<i32> = idx.keys().collect();
    assert_eq!(keys, vec![10, 30, 50, 70, 90]);
}

#[test]
fn test_ordered_delete_block_from_entry() {
    let mut idx = OrderedIndex::new();
    idx.insert(5, 2);
    idx.insert(5, 3);

    idx.delete(5, 2);
    assert_eq!(idx.lookup(5), vec![3]);
    assert_eq!(idx.len(), 1);
}

#[test]
fn test_ordered_delete_last_block_removes_entry() {
    let mut idx = OrderedIndex::new();
    idx.insert(5, 2);
    idx.insert(8, 2);

    idx.delete(5, 2);
    assert!(idx.lookup(5).is_empty());
    let keys: Vec<i32> = idx.keys().collect();
    assert_eq!(keys, vec![8]);
}

#[test]
fn test_ordered_delete_absent_is_noop() {
    let mut idx = OrderedIndex::new();
    idx.insert(5, 2);

    idx.delete(5, 99); // block not present
    idx.delete(6, 2); // key not present

    assert_eq!(idx.lookup(5), vec![2]);
    assert_eq!(idx.len(), 1);
}

#[test]
fn test_ordered_lookup_never_exposes_storage() {
    let mut idx = OrderedIndex::new();
    idx.insert(1, 2);

    let mut blocks = idx.lookup(1);
    blocks.push(99);
    assert_eq!(idx.lookup(1), vec![2]); // stored entry unchanged
}

#[test]
fn test_ordered_sort_invariant_after_mixed_ops() {
    let mut idx = OrderedIndex::new();

    // A deterministic but scrambled op sequence
    for i in 0..200 {
        let key = (i * 37) % 50;
        let block = 2 + (i % 7) as u32;
        idx.insert(key, block);
    }
    for i in 0..120 {
        let key = (i * 13) % 50;
        let block = 2 + (i % 5) as u32;
        idx.delete(key, block);
    }

    // Keys strictly ascending
    let keys: Vec<i32> = idx.keys().collect();
    for pair in keys.windows(2) {
        assert!(pair[0] < pair[1], "keys out of order: {:?}", pair);
    }

    // Each block set ascending with no duplicates
    for key in keys {
        let blocks = idx.lookup(key);
        assert!(!blocks.is_empty(), "entry with empty block set survived");
        for pair in blocks.windows(2) {
            assert!(pair[0] < pair[1], "blocks out of order: {:?}", pair);
        }
    }
}

#[test]
fn test_ordered_size_counts_pairs() {
    let mut idx = OrderedIndex::new();
    idx.insert(1, 2);
    idx.insert(1, 3);
    idx.insert(2, 2);
    assert_eq!(idx.len(), 3);

    idx.delete(1, 3);
    assert_eq!(idx.len(), 2);
}

// =============================================================================
// Hash Index
// =============================================================================

#[test]
fn test_hash_empty_lookup() {
    let idx = HashIndex::new();
    assert!(idx.lookup(42).is_empty());
    assert_eq!(idx.len(), 0);
}

#[test]
fn test_hash_insert_delete_contract() {
    let mut idx = HashIndex::new();
    idx.insert(10, 5);
    idx.insert(10, 2);
    idx.insert(10, 2); // duplicate pair suppressed

    assert_eq!(idx.lookup(10), vec![2, 5]);
    assert_eq!(idx.len(), 2);

    idx.delete(10, 2);
    assert_eq!(idx.lookup(10), vec![5]);

    idx.delete(10, 5);
    assert!(idx.lookup(10).is_empty());
    assert!(idx.is_empty());
}

#[test]
fn test_hash_negative_keys() {
    let mut idx = HashIndex::new();
    idx.insert(-7, 2);
    idx.insert(i32::MIN, 3);

    assert_eq!(idx.lookup(-7), vec![2]);
    assert_eq!(idx.lookup(i32::MIN), vec![3]);
}

// =============================================================================
// Contract Parity
// =============================================================================

/// Apply the same op sequence to both strategies and compare observable state
#[test]
fn test_ordered_and_hash_agree() {
    let mut ordered = FieldIndex::Ordered(OrderedIndex::new());
    let mut hash = FieldIndex::Hash(HashIndex::new());

    let ops: Vec<(bool, i32, u32)> = (0..300)
        .map(|i| ((i * 31) % 4 != 0, (i * 17) % 40, 2 + ((i * 11) % 9) as u32))
        .collect();

    for &(is_insert, key, block) in &ops {
        if is_insert {
            ordered.insert(key, block);
            hash.insert(key, block);
        } else {
            ordered.delete(key, block);
            hash.delete(key, block);
        }
    }

    assert_eq!(ordered.len(), hash.len());
    for key in 0..40 {
        assert_eq!(ordered.lookup(key), hash.lookup(key), "key {}", key);
    }
}
