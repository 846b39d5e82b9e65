//! Self-balancing binary search tree engines.
//!
//! Three interchangeable engines implement [`TreeEngine`]:
//!
//! - [`RedBlackTree`]: red-black tree with parent links, rebalanced by the
//!   classic insertion and deletion fixups
//! - [`AvlTree`]: AVL tree with parent links and a per-node balance factor
//!   maintained incrementally by the rotations
//! - [`RecursiveAvlTree`]: AVL tree over owned subtrees that recomputes each
//!   node's height on the way back out of every recursive call
//!
//! Every engine exposes its shape through [`TreeView`], which is all the
//! traversals ([`LevelOrder`], [`InOrder`]) and the shared lookups need.
//!
//! # Examples
//!
//! ```rust
//! use ordmap::tree::{AvlTree, TreeEngine};
//!
//! let mut tree = AvlTree::new();
//! for key in ["m", "c", "x", "a"] {
//!     tree.put(key.to_string(), key.len());
//! }
//! assert_eq!(tree.key_sorted_list(), vec!["a", "c", "m", "x"]);
//! assert_eq!(tree.key_list(), vec!["m", "c", "x", "a"]);
//! assert!(tree.check());
//! ```

mod arena;
mod avl;
mod avl_recursive;
mod in_order;
mod level_order;
mod red_black;

pub use arena::NodeId;
pub use avl::AvlTree;
pub use avl_recursive::RecursiveAvlTree;
pub use in_order::InOrder;
pub use level_order::LevelOrder;
pub use red_black::RedBlackTree;

use std::cmp::Ordering;
use std::fmt;

use crate::comparator::Comparator;
use crate::error::{InvariantViolation, Side};

// =============================================================================
// TreeView
// =============================================================================

/// Read-only structural access to a binary tree.
///
/// `Node` is whatever handle the engine uses to address a node: an arena
/// [`NodeId`] or a plain reference. Handles are only meaningful together with
/// the tree that produced them.
pub trait TreeView {
    /// The key type.
    type Key;
    /// The value type.
    type Value;
    /// A handle to one node of this tree.
    type Node<'a>: Copy
    where
        Self: 'a;

    /// The root node, if the tree is non-empty.
    fn root_node(&self) -> Option<Self::Node<'_>>;

    /// The left child of `node`.
    fn left_of<'a>(&'a self, node: Self::Node<'a>) -> Option<Self::Node<'a>>;

    /// The right child of `node`.
    fn right_of<'a>(&'a self, node: Self::Node<'a>) -> Option<Self::Node<'a>>;

    /// The entry stored in `node`.
    fn entry_of<'a>(&'a self, node: Self::Node<'a>) -> (&'a Self::Key, &'a Self::Value);
}

// =============================================================================
// TreeEngine
// =============================================================================

/// The mapping contract shared by all engines.
///
/// Engines implement the mutating operations and their own verifier; lookups,
/// extremes, listings and height are derived from [`TreeView`].
pub trait TreeEngine: TreeView {
    /// Creates an empty tree ordered by `comparator`.
    fn with_comparator(comparator: Comparator<Self::Key>) -> Self
    where
        Self: Sized;

    /// The active ordering.
    fn comparator(&self) -> &Comparator<Self::Key>;

    /// Replaces the ordering. Only an empty tree accepts a new comparator;
    /// returns whether it was installed.
    fn set_comparator(&mut self, comparator: Comparator<Self::Key>) -> bool;

    /// Inserts `value` under `key`, returning the value it replaced.
    fn put(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    /// Removes `key`, returning its value. Absent keys leave the tree untouched.
    fn delete(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Checks every structural law of this engine and reports the first
    /// broken one.
    ///
    /// # Errors
    ///
    /// Returns the [`InvariantViolation`] describing the broken law.
    fn verify(&self) -> Result<(), InvariantViolation>;

    /// Returns `true` if the tree holds no entries.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `key`.
    fn get(&self, key: &Self::Key) -> Option<&Self::Value> {
        let comparator = self.comparator();
        let mut current = self.root_node();
        while let Some(node) = current {
            let (node_key, node_value) = self.entry_of(node);
            current = match comparator.compare(key, node_key) {
                Ordering::Less => self.left_of(node),
                Ordering::Greater => self.right_of(node),
                Ordering::Equal => return Some(node_value),
            };
        }
        None
    }

    /// Returns `true` if `key` is present.
    #[inline]
    fn contains(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    /// The entry with the smallest key.
    fn min(&self) -> Option<(&Self::Key, &Self::Value)> {
        let mut node = self.root_node()?;
        while let Some(left) = self.left_of(node) {
            node = left;
        }
        Some(self.entry_of(node))
    }

    /// The entry with the largest key.
    fn max(&self) -> Option<(&Self::Key, &Self::Value)> {
        let mut node = self.root_node()?;
        while let Some(right) = self.right_of(node) {
            node = right;
        }
        Some(self.entry_of(node))
    }

    /// Keys in breadth-first order.
    fn key_list(&self) -> Vec<Self::Key>
    where
        Self: Sized,
        Self::Key: Clone,
    {
        self.level_order().map(|(key, _)| key.clone()).collect()
    }

    /// Keys in ascending order.
    fn key_sorted_list(&self) -> Vec<Self::Key>
    where
        Self: Sized,
        Self::Key: Clone,
    {
        self.in_order().map(|(key, _)| key.clone()).collect()
    }

    /// Breadth-first walk over the entries.
    fn level_order(&self) -> LevelOrder<'_, Self>
    where
        Self: Sized,
    {
        LevelOrder::new(self)
    }

    /// Ascending walk over the entries.
    fn in_order(&self) -> InOrder<'_, Self>
    where
        Self: Sized,
    {
        InOrder::new(self)
    }

    /// Number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize {
        self.root_node().map_or(0, |root| subtree_height(self, root))
    }

    /// Runs [`verify`](Self::verify) and logs the violation, if any.
    fn check(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(%violation, entries = self.len(), "tree invariant violated");
                false
            }
        }
    }
}

fn subtree_height<'a, T: TreeView + ?Sized>(tree: &'a T, node: T::Node<'a>) -> usize {
    let left = tree.left_of(node).map_or(0, |left| subtree_height(tree, left));
    let right = tree
        .right_of(node)
        .map_or(0, |right| subtree_height(tree, right));
    1 + left.max(right)
}

// =============================================================================
// Shared verification
// =============================================================================

pub(crate) fn describe<K: fmt::Debug>(key: &K) -> String {
    format!("{key:?}")
}

/// Confirms strict search order under the tree's own comparator and that the
/// recorded length matches the reachable node count.
pub(crate) fn verify_search_order<T>(tree: &T) -> Result<(), InvariantViolation>
where
    T: TreeEngine,
    T::Key: fmt::Debug,
{
    let reachable = match tree.root_node() {
        Some(root) => count_ordered(tree, root, None, None)?,
        None => 0,
    };
    if reachable == tree.len() {
        Ok(())
    } else {
        Err(InvariantViolation::Length {
            recorded: tree.len(),
            reachable,
        })
    }
}

fn count_ordered<'a, T>(
    tree: &'a T,
    node: T::Node<'a>,
    lower: Option<&'a T::Key>,
    upper: Option<&'a T::Key>,
) -> Result<usize, InvariantViolation>
where
    T: TreeEngine,
    T::Key: fmt::Debug,
{
    let comparator = tree.comparator();
    let (key, _) = tree.entry_of(node);
    if let Some(bound) = lower
        && comparator.compare(key, bound) != Ordering::Greater
    {
        return Err(InvariantViolation::OutOfOrder {
            key: describe(key),
            bound: describe(bound),
            side: Side::Right,
        });
    }
    if let Some(bound) = upper
        && comparator.compare(key, bound) != Ordering::Less
    {
        return Err(InvariantViolation::OutOfOrder {
            key: describe(key),
            bound: describe(bound),
            side: Side::Left,
        });
    }

    let left = match tree.left_of(node) {
        Some(left) => count_ordered(tree, left, lower, Some(key))?,
        None => 0,
    };
    let right = match tree.right_of(node) {
        Some(right) => count_ordered(tree, right, Some(key), upper)?,
        None => 0,
    };
    Ok(1 + left + right)
}
