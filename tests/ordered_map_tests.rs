//! Integration tests for the ordered-map facade.
//!
//! Every generic test below runs once per engine.

mod common;

use common::{engine_tests, scrambled_keys};
use ordmap::tree::TreeEngine;
use ordmap::{Comparator, OrderedMap, RedBlackMap};
use rstest::rstest;
use std::sync::Arc;
use std::thread;

fn key(text: &str) -> String {
    text.to_string()
}

fn filled<E>(keys: &[&str]) -> OrderedMap<E>
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map = OrderedMap::new();
    for &text in keys {
        map.put(key(text), format!("value-{text}"));
    }
    map
}

// =============================================================================
// Basic Contract
// =============================================================================

fn test_put_delete_scenario<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = OrderedMap::new();
    map.put(key("5"), key("a"));
    map.put(key("3"), key("b"));
    map.put(key("8"), key("c"));
    assert_eq!(map.delete(&key("3")), Some(key("b")));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&key("3")), None);
    assert_eq!(map.min_key(), Some((key("5"), key("a"))));
    assert_eq!(map.max_key(), Some((key("8"), key("c"))));
    assert!(map.check());
}

fn test_empty_map<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = OrderedMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.min_key(), None);
    assert_eq!(map.max_key(), None);
    assert!(map.key_list().is_empty());
    assert!(map.key_sorted_list().is_empty());
    assert!(!map.iter().has_next());
    assert_eq!(map.height(), 0);
    assert_eq!(map.delete(&key("missing")), None);
    assert!(map.check());
}

fn test_overwrite_returns_previous<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["b", "a", "c"]);
    let shape = map.key_list();

    assert_eq!(map.put(key("a"), key("again")), Some(key("value-a")));
    assert_eq!(map.get(&key("a")), Some(key("again")));
    assert_eq!(map.len(), 3);
    assert_eq!(map.key_list(), shape);
    assert!(map.check());
}

fn test_delete_absent_keeps_structure<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["m", "f", "t", "a", "h", "p", "z"]);
    let shape = map.key_list();

    for absent in ["b", "g", "zz", ""] {
        assert_eq!(map.delete(&key(absent)), None);
    }
    assert_eq!(map.key_list(), shape);
    assert_eq!(map.len(), 7);
    assert!(map.check());
}

fn test_delete_sole_entry<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["only"]);
    assert_eq!(map.delete(&key("only")), Some(key("value-only")));
    assert!(map.is_empty());
    assert_eq!(map.delete(&key("only")), None);
    assert!(map.check());
}

fn test_contains_tracks_membership<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["x", "y"]);
    assert!(map.contains(&key("x")));
    assert!(!map.contains(&key("z")));
    map.delete(&key("x"));
    assert!(!map.contains(&key("x")));
    assert!(map.contains(&key("y")));
}

fn test_empty_string_key<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["a", "", "b"]);
    assert_eq!(map.min_key(), Some((key(""), key("value-"))));
    assert_eq!(map.key_sorted_list(), vec![key(""), key("a"), key("b")]);
}

// =============================================================================
// Listings and Iteration
// =============================================================================

fn test_sorted_list_is_sorted_permutation<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let keys = scrambled_keys(500);
    let map: OrderedMap<E> = OrderedMap::new();
    for text in &keys {
        map.put(text.clone(), text.clone());
    }

    let sorted = map.key_sorted_list();
    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(sorted, expected);
    assert!(sorted.windows(2).all(|pair| pair[0] < pair[1]));
}

fn test_key_list_matches_iterator<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["d", "b", "f", "a", "c", "e", "g"]);

    let mut entries = map.iter();
    let mut iterated = Vec::new();
    while entries.has_next() {
        if let Some((text, value)) = entries.next() {
            assert_eq!(value, format!("value-{text}"));
            iterated.push(text);
        }
    }
    assert_eq!(iterated, map.key_list());

    let mut from_level_order = map.key_list();
    from_level_order.sort();
    assert_eq!(from_level_order, map.key_sorted_list());
}

fn test_key_list_starts_at_root<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["2", "1", "3"]);
    assert_eq!(map.key_list(), vec![key("2"), key("1"), key("3")]);
}

fn test_height_is_logarithmic<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = OrderedMap::new();
    for index in 0..1023 {
        let text = format!("{index:05}");
        map.put(text.clone(), text);
    }
    // Red-black trees stay within twice the optimal height, AVL trees
    // within about 1.44 times.
    let height = map.height();
    assert!((10..=20).contains(&height), "height {height}");
    assert!(map.check());
}

// =============================================================================
// Comparators
// =============================================================================

fn test_numeric_comparator<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = OrderedMap::with_comparator(Comparator::numeric());
    for text in ["10", "9", "100", "-1", "0"] {
        map.put(key(text), key(text));
    }
    assert_eq!(
        map.key_sorted_list(),
        vec![key("-1"), key("0"), key("9"), key("10"), key("100")]
    );
    assert_eq!(map.min_key().map(|(text, _)| text), Some(key("-1")));
    assert!(map.check());
}

fn test_reversed_comparator<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = OrderedMap::new();
    assert!(map.set_comparator(Comparator::natural().reversed()));
    for text in ["a", "c", "b"] {
        map.put(key(text), key(text));
    }
    assert_eq!(map.key_sorted_list(), vec![key("c"), key("b"), key("a")]);
    assert_eq!(map.min_key().map(|(text, _)| text), Some(key("c")));
    assert_eq!(map.get(&key("b")), Some(key("b")));
    assert!(map.check());
}

fn test_comparator_locked_once_populated<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let map: OrderedMap<E> = filled(&["10", "9"]);
    assert!(!map.set_comparator(Comparator::numeric()));
    assert_eq!(map.key_sorted_list(), vec![key("10"), key("9")]);

    map.delete(&key("10"));
    map.delete(&key("9"));
    assert!(map.set_comparator(Comparator::numeric()));
    map.put(key("10"), key("ten"));
    map.put(key("9"), key("nine"));
    assert_eq!(map.key_sorted_list(), vec![key("9"), key("10")]);
}

#[cfg(feature = "fxhash")]
fn test_hashed_comparator<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default,
{
    let comparator = Comparator::hashed();
    let map: OrderedMap<E> = OrderedMap::with_comparator(comparator.clone());
    let keys = scrambled_keys(200);
    for text in &keys {
        map.put(text.clone(), text.clone());
    }

    let mut expected = keys.clone();
    expected.sort_by(|left, right| comparator.compare(left, right));
    assert_eq!(map.key_sorted_list(), expected);
    for text in &keys {
        assert_eq!(map.get(text), Some(text.clone()));
    }
    assert!(map.check());
}

// =============================================================================
// Concurrency
// =============================================================================

fn test_concurrent_puts_are_all_kept<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default + Send + 'static,
{
    let map: Arc<OrderedMap<E>> = Arc::new(OrderedMap::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for index in 0..250 {
                    let text = format!("{worker}-{index:03}");
                    map.put(text.clone(), text);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 2000);
    assert!(map.check());
    assert_eq!(map.get(&key("7-249")), Some(key("7-249")));
}

fn test_concurrent_mixed_operations<E>()
where
    E: TreeEngine<Key = String, Value = String> + Default + Send + 'static,
{
    let map: Arc<OrderedMap<E>> = Arc::new(OrderedMap::new());
    for index in 0..400 {
        let text = format!("{index:03}");
        map.put(text.clone(), text);
    }

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for index in (worker..400).step_by(4) {
                    let text = format!("{index:03}");
                    if index % 2 == 0 {
                        assert_eq!(map.delete(&text), Some(text.clone()));
                    } else {
                        assert_eq!(map.get(&text), Some(text.clone()));
                    }
                    let _ = map.iter().count();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 200);
    assert!(map.key_sorted_list().iter().all(|text| {
        text.parse::<u32>().is_ok_and(|number| number % 2 == 1)
    }));
    assert!(map.check());
}

engine_tests!(
    String, String;
    test_put_delete_scenario,
    test_empty_map,
    test_overwrite_returns_previous,
    test_delete_absent_keeps_structure,
    test_delete_sole_entry,
    test_contains_tracks_membership,
    test_empty_string_key,
    test_sorted_list_is_sorted_permutation,
    test_key_list_matches_iterator,
    test_key_list_starts_at_root,
    test_height_is_logarithmic,
    test_numeric_comparator,
    test_reversed_comparator,
    test_comparator_locked_once_populated,
    test_concurrent_puts_are_all_kept,
    test_concurrent_mixed_operations,
);

#[cfg(feature = "fxhash")]
mod hashed {
    use super::common::engine_tests;

    use super::test_hashed_comparator;

    engine_tests!(String, String; test_hashed_comparator);
}

// =============================================================================
// Non-string Keys
// =============================================================================

#[rstest]
fn test_byte_keys_sort_lexicographically() {
    let map: RedBlackMap<Vec<u8>, u8> = RedBlackMap::new();
    map.put(vec![0x02], 2);
    map.put(vec![0x01, 0xff], 1);
    map.put(vec![0x01], 0);
    map.put(vec![], 9);
    assert_eq!(
        map.key_sorted_list(),
        vec![vec![], vec![0x01], vec![0x01, 0xff], vec![0x02]]
    );
    assert!(map.check());
}

#[rstest]
fn test_free_factories() {
    let red_black = ordmap::new::<String, ()>();
    let avl = ordmap::new_avl_map::<String, ()>();
    let recursive = ordmap::new_recursive_avl_map::<String, ()>();
    for text in ["b", "a", "c"] {
        red_black.put(key(text), ());
        avl.put(key(text), ());
        recursive.put(key(text), ());
    }
    assert_eq!(red_black.key_sorted_list(), avl.key_sorted_list());
    assert_eq!(avl.key_list(), recursive.key_list());
}
