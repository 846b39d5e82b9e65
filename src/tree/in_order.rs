//! Ascending traversal over any [`TreeView`].

use std::iter::FusedIterator;

use super::TreeView;

/// Yields entries in ascending key order.
///
/// Holds at most one root-to-leaf path on its stack.
pub struct InOrder<'a, T: TreeView + 'a> {
    tree: &'a T,
    stack: Vec<T::Node<'a>>,
}

impl<'a, T: TreeView + 'a> InOrder<'a, T> {
    /// Starts a walk at the smallest key of `tree`.
    pub fn new(tree: &'a T) -> Self {
        let mut walk = Self {
            tree,
            stack: Vec::new(),
        };
        walk.descend(tree.root_node());
        walk
    }

    fn descend(&mut self, mut node: Option<T::Node<'a>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = self.tree.left_of(current);
        }
    }
}

impl<'a, T: TreeView + 'a> Iterator for InOrder<'a, T> {
    type Item = (&'a T::Key, &'a T::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(self.tree.right_of(node));
        Some(self.tree.entry_of(node))
    }
}

impl<'a, T: TreeView + 'a> FusedIterator for InOrder<'a, T> {}
