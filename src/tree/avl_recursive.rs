//! AVL tree engine over owned subtrees.
//!
//! Nodes own their children through `Box` and store the height of the
//! subtree they root. Every mutation is a recursive descent that hands back
//! the (possibly rotated) subtree root, recomputing heights and rebalancing
//! on the way out. No node knows its parent.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use super::{TreeEngine, TreeView, describe, verify_search_order};
use crate::comparator::Comparator;
use crate::error::InvariantViolation;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// A node of a [`RecursiveAvlTree`], as seen through [`TreeView`].
#[derive(Clone)]
pub struct Node<K, V> {
    key: K,
    value: V,
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Left height minus right height.
    fn balance_factor(&self) -> isize {
        let (left, right) = (height(&self.left), height(&self.right));
        if left >= right {
            isize::try_from(left - right).unwrap_or(isize::MAX)
        } else {
            isize::try_from(right - left).map_or(isize::MIN, |difference| -difference)
        }
    }

    fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

// =============================================================================
// Rotations
// =============================================================================

fn rotate_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.left.take() else {
        return root;
    };
    root.left = pivot.right.take();
    root.update_height();
    pivot.right = Some(root);
    pivot.update_height();
    pivot
}

fn rotate_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.right.take() else {
        return root;
    };
    root.right = pivot.left.take();
    root.update_height();
    pivot.left = Some(root);
    pivot.update_height();
    pivot
}

fn rotate_left_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    root.left = root.left.take().map(rotate_left);
    rotate_right(root)
}

fn rotate_right_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    root.right = root.right.take().map(rotate_right);
    rotate_left(root)
}

/// Recomputes the height of `node` and restores its balance, choosing the
/// rotation from the balance factor of the heavy child.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    match node.balance_factor() {
        2 => {
            if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
                rotate_left_right(node)
            } else {
                rotate_right(node)
            }
        }
        -2 => {
            if node
                .right
                .as_ref()
                .is_some_and(|right| right.balance_factor() > 0)
            {
                rotate_right_left(node)
            } else {
                rotate_left(node)
            }
        }
        _ => node,
    }
}

// =============================================================================
// Insertion
// =============================================================================

struct Inserted<K, V> {
    root: Box<Node<K, V>>,
    previous: Option<V>,
    /// Where the entry went relative to `root`; `Equal` when `root` holds it.
    direction: Ordering,
}

fn insert<K, V>(
    link: Link<K, V>,
    key: K,
    value: V,
    comparator: &Comparator<K>,
) -> Inserted<K, V> {
    let Some(mut node) = link else {
        return Inserted {
            root: Node::leaf(key, value),
            previous: None,
            direction: Ordering::Equal,
        };
    };

    let direction = comparator.compare(&key, &node.key);
    let previous = match direction {
        Ordering::Equal => Some(mem::replace(&mut node.value, value)),
        Ordering::Less => {
            let child = insert(node.left.take(), key, value, comparator);
            node.left = Some(child.root);
            if node.balance_factor() == 2 {
                node = if child.direction == Ordering::Less {
                    rotate_right(node)
                } else {
                    rotate_left_right(node)
                };
            }
            child.previous
        }
        Ordering::Greater => {
            let child = insert(node.right.take(), key, value, comparator);
            node.right = Some(child.root);
            if node.balance_factor() == -2 {
                node = if child.direction == Ordering::Greater {
                    rotate_left(node)
                } else {
                    rotate_right_left(node)
                };
            }
            child.previous
        }
    };
    node.update_height();

    Inserted {
        root: node,
        previous,
        direction,
    }
}

// =============================================================================
// Deletion
// =============================================================================

fn remove<K, V>(
    link: Link<K, V>,
    key: &K,
    comparator: &Comparator<K>,
) -> (Link<K, V>, Option<(K, V)>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let removed = match comparator.compare(key, &node.key) {
        Ordering::Less => {
            let (left, removed) = remove(node.left.take(), key, comparator);
            node.left = left;
            removed
        }
        Ordering::Greater => {
            let (right, removed) = remove(node.right.take(), key, comparator);
            node.right = right;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return (None, Some(node.into_entry())),
            (Some(child), None) | (None, Some(child)) => {
                return (Some(child), Some(node.into_entry()));
            }
            (Some(left), Some(right)) => {
                let (key, value) = if left.height > right.height {
                    let (left, entry) = remove_max(left);
                    node.left = left;
                    node.right = Some(right);
                    entry
                } else {
                    let (right, entry) = remove_min(right);
                    node.left = Some(left);
                    node.right = right;
                    entry
                };
                let key = mem::replace(&mut node.key, key);
                let value = mem::replace(&mut node.value, value);
                Some((key, value))
            }
        },
    };

    (Some(rebalance(node)), removed)
}

fn remove_max<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match node.right.take() {
        None => {
            let left = node.left.take();
            (left, node.into_entry())
        }
        Some(right) => {
            let (right, entry) = remove_max(right);
            node.right = right;
            (Some(rebalance(node)), entry)
        }
    }
}

fn remove_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match node.left.take() {
        None => {
            let right = node.right.take();
            (right, node.into_entry())
        }
        Some(left) => {
            let (left, entry) = remove_min(left);
            node.left = left;
            (Some(rebalance(node)), entry)
        }
    }
}

// =============================================================================
// RecursiveAvlTree Definition
// =============================================================================

/// An AVL tree that recomputes subtree heights on every recursive return.
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::{RecursiveAvlTree, TreeEngine};
///
/// let mut tree = RecursiveAvlTree::new();
/// tree.put("b".to_string(), 2);
/// tree.put("a".to_string(), 1);
/// tree.put("c".to_string(), 3);
///
/// assert_eq!(tree.put("a".to_string(), 10), Some(1));
/// assert_eq!(tree.get(&"a".to_string()), Some(&10));
/// assert_eq!(tree.height(), 2);
/// ```
#[derive(Clone)]
pub struct RecursiveAvlTree<K, V> {
    root: Link<K, V>,
    length: usize,
    comparator: Comparator<K>,
}

impl<K: Ord + fmt::Debug + 'static, V> RecursiveAvlTree<K, V> {
    /// Creates an empty tree ordered by the key's natural order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

// =============================================================================
// Verification
// =============================================================================

impl<K: fmt::Debug, V> RecursiveAvlTree<K, V> {
    /// Returns the true height of `node`'s subtree.
    fn verify_heights(node: &Node<K, V>) -> Result<usize, InvariantViolation> {
        let left = match &node.left {
            Some(left) => Self::verify_heights(left)?,
            None => 0,
        };
        let right = match &node.right {
            Some(right) => Self::verify_heights(right)?,
            None => 0,
        };

        let actual = 1 + left.max(right);
        if node.height != actual {
            return Err(InvariantViolation::Height {
                key: describe(&node.key),
                stored: node.height,
                actual,
            });
        }
        if left.abs_diff(right) > 1 {
            return Err(InvariantViolation::Unbalanced {
                key: describe(&node.key),
                left,
                right,
            });
        }
        Ok(actual)
    }
}

// =============================================================================
// Engine Implementation
// =============================================================================

impl<K, V> TreeView for RecursiveAvlTree<K, V> {
    type Key = K;
    type Value = V;
    type Node<'a>
        = &'a Node<K, V>
    where
        Self: 'a;

    #[inline]
    fn root_node(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }

    #[inline]
    fn left_of<'a>(&'a self, node: &'a Node<K, V>) -> Option<&'a Node<K, V>> {
        node.left.as_deref()
    }

    #[inline]
    fn right_of<'a>(&'a self, node: &'a Node<K, V>) -> Option<&'a Node<K, V>> {
        node.right.as_deref()
    }

    #[inline]
    fn entry_of<'a>(&'a self, node: &'a Node<K, V>) -> (&'a K, &'a V) {
        (&node.key, &node.value)
    }
}

impl<K: fmt::Debug, V> TreeEngine for RecursiveAvlTree<K, V> {
    fn with_comparator(comparator: Comparator<K>) -> Self {
        tracing::trace!("creating recursive AVL tree");
        Self {
            root: None,
            length: 0,
            comparator,
        }
    }

    #[inline]
    fn comparator(&self) -> &Comparator<K> {
        &self.comparator
    }

    fn set_comparator(&mut self, comparator: Comparator<K>) -> bool {
        if self.length > 0 {
            return false;
        }
        self.comparator = comparator;
        true
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        let inserted = insert(self.root.take(), key, value, &self.comparator);
        self.root = Some(inserted.root);
        if inserted.previous.is_none() {
            self.length += 1;
        }
        inserted.previous
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let (root, removed) = remove(self.root.take(), key, &self.comparator);
        self.root = root;
        let (_, value) = removed?;
        self.length -= 1;
        Some(value)
    }

    #[inline]
    fn len(&self) -> usize {
        self.length
    }

    #[inline]
    fn height(&self) -> usize {
        height(&self.root)
    }

    fn verify(&self) -> Result<(), InvariantViolation> {
        verify_search_order(self)?;
        self.root
            .as_deref()
            .map_or(Ok(()), |root| Self::verify_heights(root).map(|_| ()))
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord + fmt::Debug + 'static, V> Default for RecursiveAvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RecursiveAvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.in_order()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
