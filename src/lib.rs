//! # ordmap
//!
//! In-memory ordered maps backed by interchangeable self-balancing binary
//! search tree engines.
//!
//! ## Overview
//!
//! Every map offers the same contract (put, get, delete, min/max, sorted and
//! breadth-first key listings, structural self-checks) over one of three
//! engines:
//!
//! - **Red-black**: [`RedBlackTree`](tree::RedBlackTree), the default
//! - **AVL, balance factor**: [`AvlTree`](tree::AvlTree), iterative with
//!   parent links
//! - **AVL, height**: [`RecursiveAvlTree`](tree::RecursiveAvlTree), recursive
//!   over owned subtrees
//!
//! The engines are plain single-threaded data structures implementing
//! [`TreeEngine`](tree::TreeEngine). [`OrderedMap`] wraps one behind a mutex
//! so that it can be shared between threads.
//!
//! Key order is a per-map [`Comparator`], which defaults to the key's [`Ord`]
//! and can only be replaced while the map is empty.
//!
//! ## Feature Flags
//!
//! - `fxhash` (default): [`Comparator::hashed`]
//! - `serde`: serialization of [`OrderedMap`] and [`Value`]
//! - `cli`: the `ordmap-demo` binary
//! - `full`: `fxhash` and `serde`
//!
//! ## Example
//!
//! ```rust
//! use ordmap::prelude::*;
//!
//! let map: RedBlackMap<String, Value> = ordmap::new();
//! map.put("count".to_string(), Value::Int(3));
//! map.put("name".to_string(), Value::from("tree"));
//!
//! assert_eq!(map.get_int(&"count".to_string()), Ok(Some(3)));
//! assert!(map.get_int(&"name".to_string()).is_err());
//! assert_eq!(map.key_sorted_list(), vec!["count", "name"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the facade, the engines and their traits.
///
/// # Usage
///
/// ```rust
/// use ordmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::comparator::Comparator;
    pub use crate::error::{Error, InvariantViolation};
    pub use crate::map::{AvlMap, MapIterator, OrderedMap, RecursiveAvlMap, RedBlackMap};
    pub use crate::tree::{AvlTree, RecursiveAvlTree, RedBlackTree, TreeEngine, TreeView};
    pub use crate::value::{FromValue, Value};
}

pub mod comparator;
pub mod error;
pub mod map;
pub mod tree;
pub mod value;

pub use comparator::Comparator;
pub use error::{Error, InvariantViolation, Result, Side};
pub use map::{
    AvlMap, MapIterator, OrderedMap, RecursiveAvlMap, RedBlackMap, new, new_avl_map,
    new_recursive_avl_map, new_red_black_map,
};
pub use value::{FromValue, Value};
