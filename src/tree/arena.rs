//! Slot storage for parent-linked tree nodes.
//!
//! The red-black and balance-factor AVL engines need upward walks, so their
//! nodes carry a parent link. Links of both directions are [`NodeId`]s into
//! an [`Arena`] owned by the tree: the arena is the single owner of every
//! node, and ids never keep anything alive. Freed slots are recycled through
//! a free list.

use std::ops::{Index, IndexMut};

/// A non-owning handle to a node stored in an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone)]
pub(crate) struct Arena<N> {
    slots: Vec<Option<N>>,
    free: Vec<usize>,
}

impl<N> Arena<N> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a node, reusing a freed slot when one is available.
    pub(crate) fn insert(&mut self, node: N) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(node);
            NodeId(index)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Takes a node out of the arena and frees its slot.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<N> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: NodeId) -> Option<&N> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to two distinct live nodes at once.
    pub(crate) fn pair_mut(&mut self, first: NodeId, second: NodeId) -> Option<(&mut N, &mut N)> {
        let [first, second] = self.slots.get_disjoint_mut([first.0, second.0]).ok()?;
        Some((first.as_mut()?, second.as_mut()?))
    }

    /// Number of live nodes.
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<N> Index<NodeId> for Arena<N> {
    type Output = N;

    /// # Panics
    ///
    /// Panics if `id` refers to a freed slot. Engines only hold ids of live
    /// nodes, so this indicates a broken link.
    fn index(&self, id: NodeId) -> &N {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale node id {id:?}"),
        }
    }
}

impl<N> IndexMut<NodeId> for Arena<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale node id {id:?}"),
        }
    }
}
