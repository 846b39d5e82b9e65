//! Breadth-first traversal over any [`TreeView`].

use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::TreeView;

/// Yields entries level by level, each level left to right.
///
/// The walk is single-pass: once drained it stays empty. It borrows the tree,
/// so the tree cannot be mutated while the walk is alive.
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::{RedBlackTree, TreeEngine};
///
/// let mut tree = RedBlackTree::new();
/// for key in [2, 1, 3] {
///     tree.put(key, ());
/// }
///
/// let mut walk = tree.level_order();
/// assert!(walk.has_next());
/// let keys: Vec<i32> = walk.by_ref().map(|(key, _)| *key).collect();
/// assert_eq!(keys, vec![2, 1, 3]);
/// assert!(!walk.has_next());
/// ```
pub struct LevelOrder<'a, T: TreeView + 'a> {
    tree: &'a T,
    queue: VecDeque<T::Node<'a>>,
}

impl<'a, T: TreeView + 'a> LevelOrder<'a, T> {
    /// Starts a walk at the root of `tree`.
    pub fn new(tree: &'a T) -> Self {
        let mut queue = VecDeque::new();
        if let Some(root) = tree.root_node() {
            queue.push_back(root);
        }
        Self { tree, queue }
    }

    /// Returns `true` while entries remain.
    #[inline]
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl<'a, T: TreeView + 'a> Iterator for LevelOrder<'a, T> {
    type Item = (&'a T::Key, &'a T::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        if let Some(left) = self.tree.left_of(node) {
            self.queue.push_back(left);
        }
        if let Some(right) = self.tree.right_of(node) {
            self.queue.push_back(right);
        }
        Some(self.tree.entry_of(node))
    }
}

impl<'a, T: TreeView + 'a> FusedIterator for LevelOrder<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{AvlTree, RecursiveAvlTree, RedBlackTree, TreeEngine};
    use rstest::rstest;

    #[rstest]
    fn test_empty_tree_has_nothing() {
        let tree: RedBlackTree<i32, i32> = RedBlackTree::new();
        let mut walk = tree.level_order();
        assert!(!walk.has_next());
        assert_eq!(walk.next(), None);
    }

    #[rstest]
    fn test_levels_left_to_right() {
        // 1..=7 inserted in order settles into a perfect tree under AVL.
        let mut tree = AvlTree::new();
        for key in 1..=7 {
            tree.put(key, key * 10);
        }
        let entries: Vec<(i32, i32)> = tree.level_order().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(
            entries,
            vec![(4, 40), (2, 20), (6, 60), (1, 10), (3, 30), (5, 50), (7, 70)]
        );
    }

    #[rstest]
    fn test_same_shape_across_avl_engines() {
        let mut iterative = AvlTree::new();
        let mut recursive = RecursiveAvlTree::new();
        for key in [50, 20, 80, 10, 30, 70, 90, 25] {
            iterative.put(key, ());
            recursive.put(key, ());
        }
        assert_eq!(iterative.key_list(), recursive.key_list());
    }

    #[rstest]
    fn test_stays_exhausted() {
        let mut tree = RecursiveAvlTree::new();
        tree.put("only", 1);
        let mut walk = LevelOrder::new(&tree);
        assert_eq!(walk.next(), Some((&"only", &1)));
        assert!(!walk.has_next());
        assert_eq!(walk.next(), None);
        assert_eq!(walk.next(), None);
    }
}
