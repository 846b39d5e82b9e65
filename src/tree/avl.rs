//! AVL tree engine with incrementally maintained balance factors.
//!
//! Each node records `balance = height(left) - height(right)` and a link to
//! its parent. Insertion and deletion walk back up from the touched leaf,
//! nudging balances by one and rotating where a balance reaches two. The
//! rotations update both endpoints' balances in O(1) without recomputing any
//! height.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use super::arena::{Arena, NodeId};
use super::{TreeEngine, TreeView, describe, verify_search_order};
use crate::comparator::Comparator;
use crate::error::{InvariantViolation, Side};

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    balance: i8,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    const fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            balance: 0,
            left: None,
            right: None,
            parent,
        }
    }
}

/// An AVL tree that keeps a balance factor and parent link in every node.
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::{AvlTree, TreeEngine};
///
/// let mut tree = AvlTree::new();
/// for key in 1..=1000 {
///     tree.put(key, key);
/// }
/// assert_eq!(tree.height(), 10);
/// assert_eq!(tree.max(), Some((&1000, &1000)));
/// assert!(tree.check());
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Option<NodeId>,
    length: usize,
    comparator: Comparator<K>,
}

impl<K: Ord + fmt::Debug + 'static, V> AvlTree<K, V> {
    /// Creates an empty tree ordered by the key's natural order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<K, V> AvlTree<K, V> {
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

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) if self.nodes[parent].left == Some(old) => {
                self.nodes[parent].left = new;
            }
            Some(parent) => self.nodes[parent].right = new,
        }
    }

    fn swap_entries(&mut self, first: NodeId, second: NodeId) {
        if let Some((first, second)) = self.nodes.pair_mut(first, second) {
            mem::swap(&mut first.key, &mut second.key);
            mem::swap(&mut first.value, &mut second.value);
        }
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    /// Lifts the right child of `pivot` into its place and returns it, or
    /// `None` (leaving the tree unchanged) if there is no right child.
    fn rotate_left(&mut self, pivot: NodeId) -> Option<NodeId> {
        let right = self.nodes[pivot].right?;

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

        let pivot_balance = self.nodes[pivot].balance + 1 - self.nodes[right].balance.min(0);
        self.nodes[pivot].balance = pivot_balance;
        self.nodes[right].balance += 1 + pivot_balance.max(0);
        Some(right)
    }

    /// Mirror of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, pivot: NodeId) -> Option<NodeId> {
        let left = self.nodes[pivot].left?;

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

        let pivot_balance = self.nodes[pivot].balance - 1 - self.nodes[left].balance.max(0);
        self.nodes[pivot].balance = pivot_balance;
        self.nodes[left].balance -= 1 - pivot_balance.min(0);
        Some(left)
    }

    /// Restores `|balance| <= 1` at `node`, returning the subtree's new root.
    fn rebalance(&mut self, node: NodeId) -> NodeId {
        let balance = self.nodes[node].balance;
        let rotated = if balance > 1 {
            if let Some(left) = self.nodes[node].left
                && self.nodes[left].balance < 0
            {
                self.rotate_left(left);
            }
            self.rotate_right(node)
        } else if balance < -1 {
            if let Some(right) = self.nodes[node].right
                && self.nodes[right].balance > 0
            {
                self.rotate_right(right);
            }
            self.rotate_left(node)
        } else {
            None
        };
        rotated.unwrap_or(node)
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    fn retrace_insert(&mut self, leaf: NodeId) {
        let mut child = leaf;
        while let Some(parent) = self.nodes[child].parent {
            if self.nodes[parent].left == Some(child) {
                self.nodes[parent].balance += 1;
            } else {
                self.nodes[parent].balance -= 1;
            }

            match self.nodes[parent].balance {
                0 => break,
                1 | -1 => child = parent,
                _ => {
                    // One rotation absorbs the growth for good.
                    self.rebalance(parent);
                    break;
                }
            }
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Moves the entry of `target` down to a leaf by repeatedly exchanging
    /// it with its in-order predecessor (or successor, when there is no left
    /// subtree) and returns that leaf.
    fn sink_to_leaf(&mut self, target: NodeId) -> NodeId {
        let mut node = target;
        while let Some(mut predecessor) = self.nodes[node].left {
            while let Some(right) = self.nodes[predecessor].right {
                predecessor = right;
            }
            self.swap_entries(node, predecessor);
            node = predecessor;
        }
        while let Some(mut successor) = self.nodes[node].right {
            while let Some(left) = self.nodes[successor].left {
                successor = left;
            }
            self.swap_entries(node, successor);
            node = successor;
        }
        node
    }

    /// Walks up from a leaf about to be removed, treating it as already gone.
    fn retrace_delete(&mut self, leaf: NodeId) {
        let mut child = leaf;
        while let Some(parent) = self.nodes[child].parent {
            if self.nodes[parent].left == Some(child) {
                self.nodes[parent].balance -= 1;
            } else {
                self.nodes[parent].balance += 1;
            }

            let subtree = self.rebalance(parent);
            if self.nodes[subtree].balance != 0 {
                // The subtree kept its height.
                break;
            }
            child = subtree;
        }
    }

    fn unlink_leaf(&mut self, leaf: NodeId) -> Option<(K, V)> {
        let parent = self.nodes[leaf].parent;
        match parent {
            None => self.root = None,
            Some(parent) => {
                if self.nodes[parent].left == Some(leaf) {
                    self.nodes[parent].left = None;
                } else if self.nodes[parent].right == Some(leaf) {
                    self.nodes[parent].right = None;
                }
            }
        }
        self.nodes
            .remove(leaf)
            .map(|removed| (removed.key, removed.value))
    }
}

// =============================================================================
// Verification
// =============================================================================

impl<K: fmt::Debug, V> AvlTree<K, V> {
    /// Returns the true height of the subtree at `id`.
    fn verify_balance(&self, id: NodeId) -> Result<usize, InvariantViolation> {
        let node = &self.nodes[id];
        let mut heights = [0, 0];

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
            heights[slot] = self.verify_balance(child)?;
        }

        let [left, right] = heights;
        let actual = signed(left) - signed(right);
        if i64::from(node.balance) != actual {
            return Err(InvariantViolation::BalanceFactor {
                key: describe(&node.key),
                stored: i64::from(node.balance),
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
        Ok(1 + left.max(right))
    }
}

fn signed(height: usize) -> i64 {
    i64::try_from(height).unwrap_or(i64::MAX)
}

// =============================================================================
// Engine Implementation
// =============================================================================

impl<K, V> TreeView for AvlTree<K, V> {
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

impl<K: fmt::Debug, V> TreeEngine for AvlTree<K, V> {
    fn with_comparator(comparator: Comparator<K>) -> Self {
        tracing::trace!("creating balance-factor AVL tree");
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
            self.root = Some(self.nodes.insert(Node::leaf(key, value, None)));
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

        let leaf = self.nodes.insert(Node::leaf(key, value, Some(parent)));
        match side {
            Side::Left => self.nodes[parent].left = Some(leaf),
            Side::Right => self.nodes[parent].right = Some(leaf),
        }
        self.length += 1;
        self.retrace_insert(leaf);
        None
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let target = self.find(key)?;
        let leaf = self.sink_to_leaf(target);
        self.retrace_delete(leaf);
        let (_, value) = self.unlink_leaf(leaf)?;
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
        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::RootParent {
                key: describe(&self.nodes[root].key),
            });
        }
        self.verify_balance(root).map(|_| ())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord + fmt::Debug + 'static, V> Default for AvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.in_order()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree_of(keys: &[i32]) -> AvlTree<i32, i32> {
        let mut tree = AvlTree::new();
        for &key in keys {
            tree.put(key, key * 10);
        }
        tree
    }

    fn balance_at(tree: &AvlTree<i32, i32>, key: i32) -> Option<i8> {
        tree.find(&key).map(|id| tree.nodes[id].balance)
    }

    // =========================================================================
    // Insertion Tests
    // =========================================================================

    #[rstest]
    #[case::left_left(&[3, 2, 1])]
    #[case::right_right(&[1, 2, 3])]
    #[case::left_right(&[3, 1, 2])]
    #[case::right_left(&[1, 3, 2])]
    fn test_three_keys_settle_on_middle(#[case] keys: &[i32]) {
        let tree = tree_of(keys);
        assert_eq!(tree.key_list(), vec![2, 1, 3]);
        assert_eq!(balance_at(&tree, 2), Some(0));
        assert_eq!(balance_at(&tree, 1), Some(0));
        assert_eq!(balance_at(&tree, 3), Some(0));
        assert!(tree.check());
    }

    #[rstest]
    fn test_balances_track_insertions() {
        let tree = tree_of(&[5, 3, 8, 1]);
        assert_eq!(balance_at(&tree, 5), Some(1));
        assert_eq!(balance_at(&tree, 3), Some(1));
        assert_eq!(balance_at(&tree, 8), Some(0));
        assert!(tree.check());
    }

    #[rstest]
    fn test_double_rotation_with_subtrees() {
        // 20 is left-heavy through 10's right child 15: needs left-right.
        let tree = tree_of(&[20, 10, 30, 5, 15, 12]);
        assert_eq!(tree.key_list(), vec![15, 10, 20, 5, 12, 30]);
        assert!(tree.check());
    }

    #[rstest]
    fn test_sequential_inserts_stay_logarithmic() {
        let keys: Vec<i32> = (0..1023).collect();
        let tree = tree_of(&keys);
        assert_eq!(tree.height(), 10);
        assert!(tree.check());
    }

    // =========================================================================
    // Deletion Tests
    // =========================================================================

    #[rstest]
    fn test_delete_scenario() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.delete(&3), Some(30));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(&3), None);
        assert_eq!(tree.min(), Some((&5, &50)));
        assert_eq!(tree.max(), Some((&8, &80)));
        assert!(tree.check());
    }

    #[rstest]
    fn test_delete_internal_pulls_predecessor() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4]);
        assert_eq!(tree.delete(&3), Some(30));
        assert_eq!(tree.key_list(), vec![5, 1, 8, 4]);
        assert_eq!(tree.get(&4), Some(&40));
        assert!(tree.check());
    }

    #[rstest]
    fn test_delete_without_left_uses_successor() {
        let mut tree = tree_of(&[5, 3, 8, 9]);
        assert_eq!(tree.delete(&8), Some(80));
        assert_eq!(tree.key_list(), vec![5, 3, 9]);
        assert!(tree.check());
    }

    #[rstest]
    fn test_delete_triggers_rotation() {
        let mut tree = tree_of(&[5, 3, 8, 9]);
        assert_eq!(tree.delete(&3), Some(30));
        assert_eq!(tree.key_list(), vec![8, 5, 9]);
        assert!(tree.check());
    }

    #[rstest]
    fn test_delete_cascades_rotations() {
        // Fibonacci-shaped tree: removing the shallowest leaf rebalances at
        // more than one level.
        let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        assert!(tree.check());
        assert_eq!(tree.delete(&12), Some(120));
        assert!(tree.check());
        assert_eq!(tree.key_sorted_list(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[rstest]
    fn test_delete_missing_and_root() {
        let mut tree = tree_of(&[1]);
        assert_eq!(tree.delete(&2), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.delete(&1), Some(10));
        assert!(tree.is_empty());
        assert_eq!(tree.nodes.live(), 0);
        assert!(tree.check());
    }

    // =========================================================================
    // Verification Tests
    // =========================================================================

    #[rstest]
    fn test_verify_detects_stale_balance() {
        let mut tree = tree_of(&[2, 1, 3]);
        if let Some(root) = tree.root {
            tree.nodes[root].balance = 1;
        }
        assert_eq!(
            tree.verify(),
            Err(InvariantViolation::BalanceFactor {
                key: "2".to_string(),
                stored: 1,
                actual: 0,
            })
        );
        assert!(!tree.check());
    }

    #[rstest]
    fn test_verify_detects_broken_parent_link() {
        let mut tree = tree_of(&[2, 1, 3]);
        if let Some(one) = tree.find(&1) {
            tree.nodes[one].parent = tree.find(&3);
        }
        assert_eq!(
            tree.verify(),
            Err(InvariantViolation::ParentLink {
                parent: "2".to_string(),
                child: "1".to_string(),
                side: Side::Left,
            })
        );
    }

    #[rstest]
    fn test_verify_detects_unbalanced_chain() {
        let mut tree = tree_of(&[1]);
        // Graft a two-node chain by hand, keeping balances truthful.
        let two = tree.nodes.insert(Node::leaf(2, 20, tree.root));
        let three = tree.nodes.insert(Node::leaf(3, 30, Some(two)));
        if let Some(root) = tree.root {
            tree.nodes[root].right = Some(two);
            tree.nodes[root].balance = -2;
        }
        tree.nodes[two].right = Some(three);
        tree.nodes[two].balance = -1;
        tree.length = 3;
        assert_eq!(
            tree.verify(),
            Err(InvariantViolation::Unbalanced {
                key: "1".to_string(),
                left: 0,
                right: 2,
            })
        );
    }
}
