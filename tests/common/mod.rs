//! Shared helpers for the integration tests.

/// Instantiates generic test functions once per engine.
///
/// Each listed function must be generic over a single `E: TreeEngine` with
/// the given key and value types. The expansion produces the modules
/// `red_black`, `avl` and `recursive_avl`, each holding one `#[rstest]` per
/// function. The parent module's imports are visible inside them, so key
/// and value types may be named as imported there.
macro_rules! engine_tests {
    ($key:ty, $value:ty; $($test:ident),+ $(,)?) => {
        mod red_black {
            #[allow(unused_imports)]
            use super::*;

            $(
                #[rstest::rstest]
                fn $test() {
                    super::$test::<ordmap::tree::RedBlackTree<$key, $value>>();
                }
            )+
        }

        mod avl {
            #[allow(unused_imports)]
            use super::*;

            $(
                #[rstest::rstest]
                fn $test() {
                    super::$test::<ordmap::tree::AvlTree<$key, $value>>();
                }
            )+
        }

        mod recursive_avl {
            #[allow(unused_imports)]
            use super::*;

            $(
                #[rstest::rstest]
                fn $test() {
                    super::$test::<ordmap::tree::RecursiveAvlTree<$key, $value>>();
                }
            )+
        }
    };
}

pub(crate) use engine_tests;

/// `count` distinct keys in a scrambled but deterministic order.
#[allow(dead_code)]
pub fn scrambled_keys(count: usize) -> Vec<String> {
    // Stepping by a prime visits every residue once unless `count` is a
    // multiple of it.
    (0..count)
        .map(|index| ((index * 7919) % count).to_string())
        .collect()
}
