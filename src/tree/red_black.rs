//! Red-black tree engine.
//!
//! # Overview
//!
//! [`RedBlackTree`] is a mutable red-black tree whose nodes live in an
//! arena and point back at their parents, so both fixups walk upward
//! iteratively.
//!
//! - O(log N) get, put and delete
//! - O(log N) min/max
//! - O(1) len and `is_empty`
//!
//! # Internal Structure
//!
//! After every mutation the tree satisfies:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. All leaves (NIL) are black
//! 4. Red nodes have only black children
//! 5. Every path from root to leaf has the same number of black nodes
//!
//! Missing children are treated as black NIL leaves throughout, which is why
//! the link helpers accept and return `Option<NodeId>`.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use super::arena::{Arena, NodeId};
use super::{TreeEngine, TreeView, describe, verify_search_order};
use crate::comparator::Comparator;
use crate::error::{InvariantViolation, Side};

// =============================================================================
// Color Definition
// =============================================================================

/// The color of a Red-Black Tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Creates a new red node with no children.
    const fn new_red(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        }
    }
}

// =============================================================================
// RedBlackTree Definition
// =============================================================================

/// A red-black tree keyed by a pluggable [`Comparator`].
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::{RedBlackTree, TreeEngine};
///
/// let mut tree = RedBlackTree::new();
/// tree.put("5".to_string(), "a");
/// tree.put("3".to_string(), "b");
/// tree.put("8".to_string(), "c");
/// assert_eq!(tree.delete(&"3".to_string()), Some("b"));
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.min(), Some((&"5".to_string(), &"a")));
/// assert!(tree.check());
/// ```
#[derive(Clone)]
pub struct RedBlackTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Option<NodeId>,
    length: usize,
    comparator: Comparator<K>,
}

impl<K: Ord + fmt::Debug + 'static, V> RedBlackTree<K, V> {
    /// Creates an empty tree ordered by the key's natural order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<K, V> RedBlackTree<K, V> {
    fn find(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match self.comparator.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    // =========================================================================
    // NIL-tolerant link helpers
    // =========================================================================

    fn parent_of(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.and_then(|id| self.nodes[id].parent)
    }

    fn left_child(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.and_then(|id| self.nodes[id].left)
    }

    fn right_child(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.and_then(|id| self.nodes[id].right)
    }

    fn color_of(&self, node: Option<NodeId>) -> Color {
        node.map_or(Color::Black, |id| self.nodes[id].color)
    }

    fn set_color(&mut self, node: Option<NodeId>, color: Color) {
        if let Some(id) = node {
            self.nodes[id].color = color;
        }
    }

    /// Points whatever referenced `old` (the parent's child slot, or the
    /// root) at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) if self.nodes[parent].left == Some(old) => {
                self.nodes[parent].left = new;
            }
            Some(parent) => self.nodes[parent].right = new,
        }
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    /// Lifts the right child of `node` into its place. A missing node or
    /// right child leaves the tree unchanged.
    fn rotate_left(&mut self, node: Option<NodeId>) {
        let Some(pivot) = node else { return };
        let Some(right) = self.nodes[pivot].right else {
            return;
        };

        let inner = self.nodes[right].left;
        self.nodes[pivot].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }

        let parent = self.nodes[pivot].parent;
        self.nodes[right].parent = parent;
        self.replace_child(parent, pivot, Some(right));

        self.nodes[right].left = Some(pivot);
        self.nodes[pivot].parent = Some(right);
    }

    /// Mirror of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, node: Option<NodeId>) {
        let Some(pivot) = node else { return };
        let Some(left) = self.nodes[pivot].left else {
            return;
        };

        let inner = self.nodes[left].right;
        self.nodes[pivot].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }

        let parent = self.nodes[pivot].parent;
        self.nodes[left].parent = parent;
        self.replace_child(parent, pivot, Some(left));

        self.nodes[left].right = Some(pivot);
        self.nodes[pivot].parent = Some(left);
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    fn fix_after_insertion(&mut self, inserted: NodeId) {
        let mut node = Some(inserted);

        while node.is_some()
            && node != self.root
            && self.color_of(self.parent_of(node)) == Color::Red
        {
            let parent = self.parent_of(node);
            let grandparent = self.parent_of(parent);

            if parent == self.left_child(grandparent) {
                let uncle = self.right_child(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.right_child(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.parent_of(node);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left_child(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.left_child(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.parent_of(node);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }

        self.set_color(self.root, Color::Black);
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Exchanges the entries of two distinct nodes, leaving colors and links.
    fn swap_entries(&mut self, first: NodeId, second: NodeId) {
        if let Some((first, second)) = self.nodes.pair_mut(first, second) {
            mem::swap(&mut first.key, &mut second.key);
            mem::swap(&mut first.value, &mut second.value);
        }
    }

    /// Unlinks `target` from the tree and returns its entry.
    fn remove_node(&mut self, target: NodeId) -> Option<(K, V)> {
        let mut node = target;
        if self.nodes[node].left.is_some()
            && let Some(right) = self.nodes[node].right
        {
            let successor = self.leftmost(right);
            self.swap_entries(node, successor);
            node = successor;
        }

        let replacement = self.nodes[node].left.or(self.nodes[node].right);
        let parent = self.nodes[node].parent;

        if let Some(replacement) = replacement {
            self.nodes[replacement].parent = parent;
            self.replace_child(parent, node, Some(replacement));
            if self.nodes[node].color == Color::Black {
                self.fix_after_deletion(Some(replacement));
            }
        } else if parent.is_none() {
            self.root = None;
        } else {
            // A childless node stands in for its own NIL during the fixup
            // and is only cut loose afterwards.
            if self.nodes[node].color == Color::Black {
                self.fix_after_deletion(Some(node));
            }
            if let Some(parent) = self.nodes[node].parent {
                if self.nodes[parent].left == Some(node) {
                    self.nodes[parent].left = None;
                } else if self.nodes[parent].right == Some(node) {
                    self.nodes[parent].right = None;
                }
            }
        }

        self.nodes
            .remove(node)
            .map(|removed| (removed.key, removed.value))
    }

    fn fix_after_deletion(&mut self, start: Option<NodeId>) {
        let mut node = start;

        while node != self.root && self.color_of(node) == Color::Black {
            if node == self.left_child(self.parent_of(node)) {
                let mut sibling = self.right_child(self.parent_of(node));

                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(self.parent_of(node), Color::Red);
                    self.rotate_left(self.parent_of(node));
                    sibling = self.right_child(self.parent_of(node));
                }

                if self.color_of(self.left_child(sibling)) == Color::Black
                    && self.color_of(self.right_child(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    node = self.parent_of(node);
                } else {
                    if self.color_of(self.right_child(sibling)) == Color::Black {
                        self.set_color(self.left_child(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right_child(self.parent_of(node));
                    }
                    self.set_color(sibling, self.color_of(self.parent_of(node)));
                    self.set_color(self.parent_of(node), Color::Black);
                    self.set_color(self.right_child(sibling), Color::Black);
                    self.rotate_left(self.parent_of(node));
                    node = self.root;
                }
            } else {
                let mut sibling = self.left_child(self.parent_of(node));

                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(self.parent_of(node), Color::Red);
                    self.rotate_right(self.parent_of(node));
                    sibling = self.left_child(self.parent_of(node));
                }

                if self.color_of(self.right_child(sibling)) == Color::Black
                    && self.color_of(self.left_child(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    node = self.parent_of(node);
                } else {
                    if self.color_of(self.left_child(sibling)) == Color::Black {
                        self.set_color(self.right_child(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left_child(self.parent_of(node));
                    }
                    self.set_color(sibling, self.color_of(self.parent_of(node)));
                    self.set_color(self.parent_of(node), Color::Black);
                    self.set_color(self.left_child(sibling), Color::Black);
                    self.rotate_right(self.parent_of(node));
                    node = self.root;
                }
            }
        }

        self.set_color(node, Color::Black);
    }
}

// =============================================================================
// Verification
// =============================================================================

impl<K: fmt::Debug, V> RedBlackTree<K, V> {
    /// Returns the black height of the subtree at `id`, counting the NIL
    /// leaves as one.
    fn verify_colors(&self, id: NodeId) -> Result<usize, InvariantViolation> {
        let node = &self.nodes[id];
        let mut heights = [1, 1];

        for (slot, (child, side)) in [(node.left, Side::Left), (node.right, Side::Right)]
            .into_iter()
            .enumerate()
        {
            let Some(child) = child else { continue };
            let child_node = &self.nodes[child];
            if child_node.parent != Some(id) {
                return Err(InvariantViolation::ParentLink {
                    parent: describe(&node.key),
                    child: describe(&child_node.key),
                    side,
                });
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(InvariantViolation::RedRed {
                    parent: describe(&node.key),
                    child: describe(&child_node.key),
                    side,
                });
            }
            heights[slot] = self.verify_colors(child)?;
        }

        let [left, right] = heights;
        if left != right {
            return Err(InvariantViolation::BlackHeight {
                key: describe(&node.key),
                left,
                right,
            });
        }
        Ok(left + usize::from(node.color == Color::Black))
    }
}

// =============================================================================
// Engine Implementation
// =============================================================================

impl<K, V> TreeView for RedBlackTree<K, V> {
    type Key = K;
    type Value = V;
    type Node<'a>
        = NodeId
    where
        Self: 'a;

    #[inline]
    fn root_node(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    fn left_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].left
    }

    #[inline]
    fn right_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].right
    }

    #[inline]
    fn entry_of(&self, node: NodeId) -> (&K, &V) {
        let node = &self.nodes[node];
        (&node.key, &node.value)
    }
}

impl<K: fmt::Debug, V> TreeEngine for RedBlackTree<K, V> {
    fn with_comparator(comparator: Comparator<K>) -> Self {
        tracing::trace!("creating red-black tree");
        Self {
            nodes: Arena::new(),
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
        let Some(mut current) = self.root else {
            let mut root = Node::new_red(key, value, None);
            root.color = Color::Black;
            self.root = Some(self.nodes.insert(root));
            self.length = 1;
            return None;
        };

        let (parent, side) = loop {
            let node = &self.nodes[current];
            match self.comparator.compare(&key, &node.key) {
                Ordering::Less => match node.left {
                    Some(left) => current = left,
                    None => break (current, Side::Left),
                },
                Ordering::Greater => match node.right {
                    Some(right) => current = right,
                    None => break (current, Side::Right),
                },
                Ordering::Equal => {
                    return Some(mem::replace(&mut self.nodes[current].value, value));
                }
            }
        };

        let inserted = self.nodes.insert(Node::new_red(key, value, Some(parent)));
        match side {
            Side::Left => self.nodes[parent].left = Some(inserted),
            Side::Right => self.nodes[parent].right = Some(inserted),
        }
        self.length += 1;
        self.fix_after_insertion(inserted);
        None
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let target = self.find(key)?;
        let (_, value) = self.remove_node(target)?;
        self.length -= 1;
        Some(value)
    }

    #[inline]
    fn len(&self) -> usize {
        self.length
    }

    fn verify(&self) -> Result<(), InvariantViolation> {
        verify_search_order(self)?;
        let Some(root) = self.root else {
            return Ok(());
        };
        let node = &self.nodes[root];
        if node.parent.is_some() {
            return Err(InvariantViolation::RootParent {
                key: describe(&node.key),
            });
        }
        if node.color == Color::Red {
            return Err(InvariantViolation::RedRoot {
                key: describe(&node.key),
            });
        }
        self.verify_colors(root).map(|_| ())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord + fmt::Debug + 'static, V> Default for RedBlackTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RedBlackTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.in_order()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
