//! Depth-first iteration over stored keys.

use std::iter::FusedIterator;

use crate::node::{Arena, NodeId};

/// An iterator over the entries of a tree or of a [`PrefixView`](crate::PrefixView).
///
/// Entries are yielded as `(key, &value)` in lexicographic byte order: a node's
/// own key comes before the keys below it, and children are visited in
/// ascending order of their first byte. The walk keeps an explicit stack, so
/// deep trees do not grow the call stack.
pub struct Iter<'a, V> {
    arena: &'a Arena<V>,

    /// Nodes still to visit, each with the key leading up to its label
    stack: Vec<(NodeId, Vec<u8>)>,
}

impl<'a, V> Iter<'a, V> {
    /// Starts at `start`, whose label follows `base` in every yielded key.
    pub(crate) fn new(arena: &'a Arena<V>, start: NodeId, base: Vec<u8>) -> Self {
        Iter {
            arena,
            stack: vec![(start, base)],
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, mut key)) = self.stack.pop() {
            let node = self.arena.get(id);
            key.extend_from_slice(&node.label);

            let mut children: Vec<(u8, NodeId)> =
                node.children.iter().map(|(&byte, &child)| (byte, child)).collect();
            // Popped in ascending order
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            for (_, child) in children {
                self.stack.push((child, key.clone()));
            }

            if let Some(value) = &node.value {
                return Some((key, value));
            }
        }
        None
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
