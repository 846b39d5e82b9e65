//! Property-based tests for the tree engines.
//!
//! Each engine is driven with random operation sequences and compared step by
//! step against `std::collections::BTreeMap`, with the structural checks run
//! after every mutation.

use ordmap::tree::{AvlTree, RecursiveAvlTree, RedBlackTree, TreeEngine};
use ordmap::{Comparator, OrderedMap};
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Debug, Clone)]
enum Operation {
    Put(u16, u32),
    Delete(u16),
}

/// Keys are drawn from a small range so that overwrites and hits on delete
/// are frequent.
fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0u16..256, any::<u32>()).prop_map(|(key, value)| Operation::Put(key, value)),
        2 => (0u16..256).prop_map(Operation::Delete),
    ]
}

fn operations(max_size: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation(), 0..max_size)
}

fn replay<E>(operations: &[Operation]) -> Result<(), TestCaseError>
where
    E: TreeEngine<Key = u16, Value = u32> + Default,
{
    let mut engine = E::default();
    let mut model = BTreeMap::new();

    for operation in operations {
        match *operation {
            Operation::Put(key, value) => {
                prop_assert_eq!(engine.put(key, value), model.insert(key, value));
            }
            Operation::Delete(key) => {
                prop_assert_eq!(engine.delete(&key), model.remove(&key));
            }
        }
        prop_assert_eq!(engine.verify(), Ok(()));
        prop_assert_eq!(engine.len(), model.len());
    }

    prop_assert_eq!(engine.key_sorted_list(), model.keys().copied().collect::<Vec<_>>());
    prop_assert_eq!(
        engine.min().map(|(key, value)| (*key, *value)),
        model.first_key_value().map(|(key, value)| (*key, *value))
    );
    prop_assert_eq!(
        engine.max().map(|(key, value)| (*key, *value)),
        model.last_key_value().map(|(key, value)| (*key, *value))
    );
    for key in 0u16..256 {
        prop_assert_eq!(engine.get(&key), model.get(&key));
    }
    Ok(())
}

// =============================================================================
// Model Laws
// =============================================================================

proptest! {
    /// Law: a red-black tree behaves like `BTreeMap` and stays valid.
    #[test]
    fn prop_red_black_matches_model(operations in operations(300)) {
        replay::<RedBlackTree<u16, u32>>(&operations)?;
    }

    /// Law: a balance-factor AVL tree behaves like `BTreeMap` and stays valid.
    #[test]
    fn prop_avl_matches_model(operations in operations(300)) {
        replay::<AvlTree<u16, u32>>(&operations)?;
    }

    /// Law: a height-based AVL tree behaves like `BTreeMap` and stays valid.
    #[test]
    fn prop_recursive_avl_matches_model(operations in operations(300)) {
        replay::<RecursiveAvlTree<u16, u32>>(&operations)?;
    }
}

// =============================================================================
// Get-Put Laws
// =============================================================================

proptest! {
    /// Law: get after put returns the value just put.
    #[test]
    fn prop_get_put_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..50),
        key: i32,
        value: i32
    ) {
        let map: OrderedMap<RedBlackTree<i32, i32>> = entries.into_iter().collect();
        map.put(key, value);
        prop_assert_eq!(map.get(&key), Some(value));
    }

    /// Law: delete is idempotent and leaves the shape of the tree alone
    /// when the key is absent.
    #[test]
    fn prop_delete_absent_law(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..50),
        key: i32
    ) {
        let map: OrderedMap<AvlTree<i32, i32>> = entries.into_iter().collect();
        map.delete(&key);
        let shape = map.key_list();
        let length = map.len();
        prop_assert_eq!(map.delete(&key), None);
        prop_assert_eq!(map.key_list(), shape);
        prop_assert_eq!(map.len(), length);
    }

    /// Law: the sorted listing is strictly increasing and is a permutation
    /// of the breadth-first listing.
    #[test]
    fn prop_sorted_listing_law(
        keys in prop::collection::vec(any::<i64>(), 0..100)
    ) {
        let map: OrderedMap<RecursiveAvlTree<i64, ()>> =
            keys.into_iter().map(|key| (key, ())).collect();
        let sorted = map.key_sorted_list();
        prop_assert!(sorted.windows(2).all(|pair| pair[0] < pair[1]));
        let mut level_order = map.key_list();
        level_order.sort_unstable();
        prop_assert_eq!(level_order, sorted);
    }

    /// Law: all engines agree on contents for the same input.
    #[test]
    fn prop_engines_agree(operations in operations(200)) {
        let mut red_black: RedBlackTree<u16, u32> = RedBlackTree::new();
        let mut avl: AvlTree<u16, u32> = AvlTree::new();
        let mut recursive: RecursiveAvlTree<u16, u32> = RecursiveAvlTree::new();
        for operation in &operations {
            match *operation {
                Operation::Put(key, value) => {
                    red_black.put(key, value);
                    avl.put(key, value);
                    recursive.put(key, value);
                }
                Operation::Delete(key) => {
                    red_black.delete(&key);
                    avl.delete(&key);
                    recursive.delete(&key);
                }
            }
        }
        let red_black_entries: Vec<_> = red_black.in_order().collect();
        let avl_entries: Vec<_> = avl.in_order().collect();
        let recursive_entries: Vec<_> = recursive.in_order().collect();
        prop_assert_eq!(&red_black_entries, &avl_entries);
        prop_assert_eq!(&avl_entries, &recursive_entries);
    }

    /// Law: a reversed comparator yields the reversed sorted listing.
    #[test]
    fn prop_reversed_comparator_law(
        keys in prop::collection::vec(any::<u32>(), 0..100)
    ) {
        let natural: OrderedMap<AvlTree<u32, ()>> = OrderedMap::new();
        let reversed: OrderedMap<AvlTree<u32, ()>> =
            OrderedMap::with_comparator(Comparator::natural().reversed());
        for key in keys {
            natural.put(key, ());
            reversed.put(key, ());
        }
        let mut expected = natural.key_sorted_list();
        expected.reverse();
        prop_assert_eq!(reversed.key_sorted_list(), expected);
        prop_assert!(reversed.check());
    }
}
