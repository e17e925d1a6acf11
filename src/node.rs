//! Node storage for the radix tree.
//!
//! Nodes live in an [`Arena`] and refer to each other through [`NodeId`]s.
//! A node owns its children through the arena: the `children` map holds their
//! ids, keyed by the first byte of each child's label. `parent` is a plain
//! back-reference used to walk upward when nodes are split, freed or merged.

use std::collections::{HashMap, TryReserveError};
use std::mem;

use crate::{violated, InvariantViolation};

/// Handle to a node stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Internal node type for the radix tree.
///
/// The label is the edge from the parent to this node. A node holding a value
/// is terminal: the labels on the path from the root spell a stored key.
/// Terminal nodes may still have children when their key is a strict prefix
/// of other stored keys.
#[derive(Debug)]
pub(crate) struct Node<V> {
    /// The edge label leading to this node (empty only for the root)
    pub label: Vec<u8>,

    /// The payload stored at this node, if any
    pub value: Option<V>,

    /// Child nodes indexed by the first byte of their label
    pub children: HashMap<u8, NodeId>,

    /// The node owning this one, `None` for the root
    pub parent: Option<NodeId>,
}

impl<V> Node<V> {
    /// Creates a new node without a value
    pub fn new(label: Vec<u8>) -> Self {
        Node {
            label,
            value: None,
            children: HashMap::new(),
            parent: None,
        }
    }

    /// Creates a new terminal node with the given label and value
    pub fn with_value(label: Vec<u8>, value: V) -> Self {
        Node {
            value: Some(value),
            ..Node::new(label)
        }
    }

    /// Returns whether this node is a leaf node (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns whether the path to this node is a stored key
    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }
}

/// Slab of nodes with a free list.
///
/// Every allocation the tree performs during a mutation is reserved with
/// [`Arena::reserve`] first, so that [`Arena::alloc`] and [`Arena::free`]
/// never allocate while the tree is half-way through a structural change.
#[derive(Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Makes room for `additional` nodes.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let fresh = additional.saturating_sub(self.free.len());
        self.slots.try_reserve(fresh)?;
        // The free list must be able to hold every slot.
        let slots = self.slots.len() + fresh;
        self.free.try_reserve(slots.saturating_sub(self.free.len()))?;
        Ok(())
    }

    /// Stores a detached node and returns its id.
    pub fn alloc(&mut self, node: Node<V>) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: NodeId) -> &Node<V> {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => violated(InvariantViolation::DanglingNode),
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<V> {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => violated(InvariantViolation::DanglingNode),
        }
    }

    /// Removes every node, handing them out in slot order.
    pub fn drain(&mut self) -> impl Iterator<Item = Node<V>> + '_ {
        self.free.clear();
        self.slots.drain(..).flatten()
    }

    fn release(&mut self, id: NodeId) -> Node<V> {
        let node = match self.slots.get_mut(id.0).and_then(Option::take) {
            Some(node) => node,
            None => violated(InvariantViolation::DanglingNode),
        };
        self.free.push(id.0);
        node
    }

    /// Links `child` under `parent`. The parent's child map must have room.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        let byte = match self.get(child).label.first() {
            Some(&byte) => byte,
            None => violated(InvariantViolation::EmptyLabel { key: Vec::new() }),
        };
        self.get_mut(child).parent = Some(parent);
        if self.get_mut(parent).children.insert(byte, child).is_some() {
            violated(InvariantViolation::SiblingConflict { byte });
        }
    }

    /// Splits the edge leading to `id` after `offset` bytes.
    ///
    /// `intermediate` must carry `label[..offset]` and have room for its
    /// children. It takes the place of `id` under the old parent and `id` is
    /// reparented below it, keeping the rest of its label, its value and its
    /// children. Returns the id of the intermediate node.
    pub fn split(&mut self, id: NodeId, offset: usize, intermediate: Node<V>) -> NodeId {
        debug_assert!(offset > 0 && offset < self.get(id).label.len());
        debug_assert_eq!(intermediate.label[..], self.get(id).label[..offset]);

        let parent = match self.get(id).parent {
            Some(parent) => parent,
            None => violated(InvariantViolation::DetachedNode),
        };
        let byte = intermediate.label[0];

        let middle = self.alloc(intermediate);
        self.get_mut(middle).parent = Some(parent);
        // Overwrite in place: `insert` may grow the parent's map.
        let replaced = match self.get_mut(parent).children.get_mut(&byte) {
            Some(slot) if *slot == id => {
                *slot = middle;
                true
            }
            _ => false,
        };
        if !replaced {
            violated(InvariantViolation::ParentMismatch {
                key: self.get(id).label.clone(),
            });
        }

        self.get_mut(id).label.drain(..offset);
        self.attach(middle, id);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            prefix = %String::from_utf8_lossy(&self.get(middle).label),
            rest = %String::from_utf8_lossy(&self.get(id).label),
            "split edge"
        );

        middle
    }

    /// Makes room in the label of `id` for merging it with its sole child, the
    /// one that remains once `leaving` is gone.
    pub fn reserve_merge(&mut self, id: NodeId, leaving: Option<NodeId>) -> Result<(), TryReserveError> {
        let remaining = self
            .get(id)
            .children
            .values()
            .copied()
            .find(|&child| Some(child) != leaving);
        let extra = match remaining {
            Some(child) => self.get(child).label.len(),
            None => return Ok(()),
        };
        self.get_mut(id).label.try_reserve(extra)
    }

    /// Collapses `id` with its only child.
    ///
    /// The child's label is appended to the node's, the child's value and
    /// children move up, and the child's slot is released.
    pub fn merge(&mut self, id: NodeId) {
        let node = self.get(id);
        if node.value.is_some() {
            violated(InvariantViolation::MergeWithPayload);
        }
        let child = match (node.children.len(), node.children.values().next()) {
            (1, Some(&child)) => child,
            (children, _) => violated(InvariantViolation::MergeWithoutSoleChild { children }),
        };

        let mut absorbed = self.release(child);
        for &grandchild in absorbed.children.values() {
            self.get_mut(grandchild).parent = Some(id);
        }

        let node = self.get_mut(id);
        node.label.append(&mut absorbed.label);
        node.value = absorbed.value.take();
        node.children = mem::take(&mut absorbed.children);

        #[cfg(feature = "tracing")]
        tracing::trace!(label = %String::from_utf8_lossy(&self.get(id).label), "merged edge");
    }

    /// Unlinks the leaf `id` from its parent, releases it and returns its value.
    pub fn free(&mut self, id: NodeId) -> Option<V> {
        let node = self.get(id);
        if !node.is_leaf() {
            violated(InvariantViolation::FreeNonLeaf);
        }
        let parent = match node.parent {
            Some(parent) => parent,
            None => violated(InvariantViolation::DetachedNode),
        };
        let byte = node.label[0];

        if self.get_mut(parent).children.remove(&byte) != Some(id) {
            violated(InvariantViolation::ParentMismatch {
                key: self.get(id).label.clone(),
            });
        }

        let node = self.release(id);

        #[cfg(feature = "tracing")]
        tracing::trace!(label = %String::from_utf8_lossy(&node.label), "freed leaf");

        node.value
    }
}
