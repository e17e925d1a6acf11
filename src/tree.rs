//! The main tree implementation.
//!
//! This module contains the `RadixTree` type, which provides the primary API
//! for working with the radix tree data structure.

use std::fmt;

use crate::iter::Iter;
use crate::node::{Arena, Node, NodeId};
use crate::prefix_view::PrefixView;
use crate::traverse::{traverse, Match};
use crate::util::try_label;
use crate::{violated, Error, InvariantViolation};

type DestroyHook<V> = Box<dyn FnMut(V)>;

/// A mutable radix tree mapping byte-string keys to values.
///
/// Every edge of the tree carries a byte string. Siblings never share a first
/// byte, and a node without a value always has at least two children (the
/// root excepted), so each stored key is reached along exactly one path of
/// maximally compressed edges.
///
/// Values discarded by the tree (replaced, deleted, cleared or still present
/// when the tree is dropped) are passed to the destroy hook given to
/// [`RadixTree::with_destroy`], or simply dropped when there is none.
pub struct RadixTree<V> {
    /// Storage for every node, the root included
    pub(crate) arena: Arena<V>,

    /// The root node; its label is always empty and it never holds a value
    pub(crate) root: NodeId,

    /// The number of keys stored in the tree
    size: usize,

    destroy: Option<DestroyHook<V>>,
}

impl<V> RadixTree<V> {
    /// Creates a new, empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_mutable::RadixTree;
    ///
    /// let tree = RadixTree::<i32>::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::new(Vec::new()));
        RadixTree {
            arena,
            root,
            size: 0,
            destroy: None,
        }
    }

    /// Creates a new, empty tree that hands every discarded value to `destroy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use radix_mutable::RadixTree;
    ///
    /// let destroyed = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&destroyed);
    ///
    /// let mut tree = RadixTree::with_destroy(move |value| sink.borrow_mut().push(value));
    /// tree.insert("dog", 1).unwrap();
    /// tree.insert_or_replace("dog", 2).unwrap();
    /// assert_eq!(*destroyed.borrow(), vec![1]);
    ///
    /// drop(tree);
    /// assert_eq!(*destroyed.borrow(), vec![1, 2]);
    /// ```
    pub fn with_destroy<F>(destroy: F) -> Self
    where
        F: FnMut(V) + 'static,
    {
        let mut tree = RadixTree::new();
        tree.destroy = Some(Box::new(destroy));
        tree
    }

    /// Returns the number of keys stored in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Retrieves a reference to the value stored for exactly `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_mutable::{Error, RadixTree};
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert("toaster", 42).unwrap();
    ///
    /// assert_eq!(tree.get("toaster"), Ok(&42));
    /// assert_eq!(tree.get("toast"), Err(Error::NotFound));
    /// ```
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<&V, Error> {
        let id = self.find(key.as_ref()).ok_or(Error::NotFound)?;
        self.arena.get(id).value.as_ref().ok_or(Error::NotFound)
    }

    /// Retrieves a mutable reference to the value stored for exactly `key`.
    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<&mut V, Error> {
        let id = self.find(key.as_ref()).ok_or(Error::NotFound)?;
        self.arena.get_mut(id).value.as_mut().ok_or(Error::NotFound)
    }

    /// Returns `true` if the tree stores exactly `key`.
    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.find(key.as_ref()).is_some()
    }

    /// Returns a view of every stored key that starts with `prefix`.
    ///
    /// Fails with [`Error::NotFound`] when no stored key starts with it. The
    /// empty prefix views the whole tree, provided it is not empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_mutable::RadixTree;
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert("car", 1).unwrap();
    /// tree.insert("cart", 2).unwrap();
    /// tree.insert("dog", 3).unwrap();
    ///
    /// let view = tree.prefix("ca").unwrap();
    /// assert_eq!(view.len(), 2);
    /// assert!(tree.prefix("cat").is_err());
    /// ```
    pub fn prefix<K: AsRef<[u8]> + ?Sized>(&self, prefix: &K) -> Result<PrefixView<'_, V>, Error> {
        let prefix = prefix.as_ref();
        let m = traverse(&self.arena, self.root, prefix);

        if m.consumed != prefix.len() || (m.node == self.root && self.is_empty()) {
            return Err(Error::NotFound);
        }

        Ok(PrefixView::new(self, prefix.to_vec(), m.node))
    }

    /// Inserts `value` under `key`.
    ///
    /// Fails with [`Error::KeyConflict`] if the key is already stored, leaving
    /// the stored value in place, and with [`Error::InvalidKey`] for an empty
    /// key. On failure `value` is dropped without reaching the destroy hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_mutable::{Error, RadixTree};
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert("dog", 1).unwrap();
    ///
    /// assert_eq!(tree.insert("dog", 2), Err(Error::KeyConflict));
    /// assert_eq!(tree.get("dog"), Ok(&1));
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Result<(), Error> {
        self.insert_with(key.as_ref(), value, false)
    }

    /// Inserts `value` under `key`, replacing any value already stored there.
    ///
    /// The replaced value is passed to the destroy hook.
    pub fn insert_or_replace<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Result<(), Error> {
        self.insert_with(key.as_ref(), value, true)
    }

    fn insert_with(&mut self, key: &[u8], value: V, replace: bool) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::InvalidKey);
        }

        let m = traverse(&self.arena, self.root, key);

        if m.edge < self.arena.get(m.node).label.len() {
            return self.insert_split(m, key, value);
        }

        if m.consumed < key.len() {
            return self.insert_child(m.node, &key[m.consumed..], value);
        }

        // The key ends exactly at this node.
        let node = self.arena.get_mut(m.node);
        if node.value.is_none() {
            // A branching node becomes terminal.
            node.value = Some(value);
            self.size += 1;
            return Ok(());
        }
        if !replace {
            return Err(Error::KeyConflict);
        }
        if let Some(old) = node.value.replace(value) {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %String::from_utf8_lossy(key), "replaced value");

            self.discard(old);
        }
        Ok(())
    }

    /// Adds a terminal child labeled `rest` below `parent`.
    fn insert_child(&mut self, parent: NodeId, rest: &[u8], value: V) -> Result<(), Error> {
        self.arena.reserve(1)?;
        self.arena.get_mut(parent).children.try_reserve(1)?;
        let leaf = Node::with_value(try_label(rest)?, value);

        let id = self.arena.alloc(leaf);
        self.arena.attach(parent, id);
        self.size += 1;
        Ok(())
    }

    /// Splits the edge into `m.node` where `key` diverges from it.
    fn insert_split(&mut self, m: Match, key: &[u8], value: V) -> Result<(), Error> {
        let exhausted = m.consumed == key.len();

        let mut middle = Node::new(try_label(&self.arena.get(m.node).label[..m.edge])?);
        middle.children.try_reserve(if exhausted { 1 } else { 2 })?;

        let leaf = if exhausted {
            // The key is a strict prefix of the edge: the split point is its terminus.
            middle.value = Some(value);
            None
        } else {
            Some(Node::with_value(try_label(&key[m.consumed..])?, value))
        };
        self.arena.reserve(if leaf.is_some() { 2 } else { 1 })?;

        let middle = self.arena.split(m.node, m.edge, middle);
        if let Some(leaf) = leaf {
            let id = self.arena.alloc(leaf);
            self.arena.attach(middle, id);
        }
        self.size += 1;
        Ok(())
    }

    /// Deletes `key`, passing its value to the destroy hook.
    ///
    /// Only exact matches are deleted: a key that is merely a prefix of stored
    /// keys fails with [`Error::NotFound`] and the tree is left unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `key` is not stored. [`Error::OutOfMemory`]
    /// when the edge left behind must be merged and its label cannot grow; the
    /// key stays stored in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_mutable::{Error, RadixTree};
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert("cart", 1).unwrap();
    /// tree.insert("care", 2).unwrap();
    ///
    /// assert_eq!(tree.delete("car"), Err(Error::NotFound));
    /// tree.delete("cart").unwrap();
    /// assert_eq!(tree.get("cart"), Err(Error::NotFound));
    /// assert_eq!(tree.get("care"), Ok(&2));
    /// ```
    pub fn delete<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<(), Error> {
        let value = self.take(key.as_ref())?;
        self.discard(value);
        Ok(())
    }

    /// Removes `key` and returns its value instead of destroying it.
    ///
    /// # Errors
    ///
    /// Fails like [`RadixTree::delete`], leaving the tree unchanged.
    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<V, Error> {
        self.take(key.as_ref())
    }

    fn take(&mut self, key: &[u8]) -> Result<V, Error> {
        let id = self.find(key).ok_or(Error::NotFound)?;
        let node = self.arena.get(id);

        if !node.is_leaf() {
            // Other keys run through this node: only drop its terminal marker.
            let collapses = node.children.len() == 1;
            if collapses {
                self.arena.reserve_merge(id, None)?;
            }
            let value = self.take_value(id);
            if collapses {
                self.arena.merge(id);
            }
            return Ok(value);
        }

        let parent = match node.parent {
            Some(parent) => parent,
            None => violated(InvariantViolation::DetachedNode),
        };

        // Freeing the leaf leaves a non-terminal parent with one child to merge.
        let owner = self.arena.get(parent);
        if parent != self.root && !owner.is_terminal() && owner.children.len() == 2 {
            self.arena.reserve_merge(parent, Some(id))?;
        }

        let value = match self.arena.free(id) {
            Some(value) => value,
            None => violated(InvariantViolation::NonTerminalLeaf { key: key.to_vec() }),
        };
        self.size -= 1;
        self.collapse(parent);
        Ok(value)
    }

    fn take_value(&mut self, id: NodeId) -> V {
        let value = self.arena.get_mut(id).value.take();
        match value {
            Some(value) => {
                self.size -= 1;
                value
            }
            None => violated(InvariantViolation::NonTerminalLeaf {
                key: self.path_to(id),
            }),
        }
    }

    /// Merges non-terminal single-child nodes from `start` upward, stopping
    /// at the first node that needs no change or at the root.
    fn collapse(&mut self, start: NodeId) {
        let mut cursor = start;

        while cursor != self.root {
            let node = self.arena.get(cursor);
            if node.is_terminal() || node.children.len() > 1 {
                return;
            }
            if node.is_leaf() {
                violated(InvariantViolation::NonTerminalLeaf {
                    key: self.path_to(cursor),
                });
            }
            let parent = node.parent;

            self.arena.merge(cursor);

            cursor = match parent {
                Some(parent) => parent,
                None => violated(InvariantViolation::DetachedNode),
            };
        }
    }

    /// Removes every key, passing each value to the destroy hook.
    pub fn clear(&mut self) {
        self.teardown();
        self.root = self.arena.alloc(Node::new(Vec::new()));
    }

    fn teardown(&mut self) {
        let destroy = &mut self.destroy;
        for node in self.arena.drain() {
            if let Some(value) = node.value {
                if let Some(destroy) = destroy.as_mut() {
                    destroy(value);
                }
            }
        }
        self.size = 0;
    }

    fn discard(&mut self, value: V) {
        if let Some(destroy) = self.destroy.as_mut() {
            destroy(value);
        }
    }

    /// Returns an iterator over `(key, &value)` pairs in lexicographic key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.root, Vec::new())
    }

    /// Returns an iterator over the stored keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Renders the node structure, one node per line, for debugging.
    ///
    /// Each line shows a node's label, its number of children and a `*` when
    /// the node is terminal. Children are listed in ascending byte order.
    ///
    /// ```
    /// use radix_mutable::RadixTree;
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert("toast", ()).unwrap();
    /// tree.insert("toaster", ()).unwrap();
    ///
    /// assert_eq!(tree.dump(), "<root> (1)\n  \"toast\" (1) *\n    \"er\" (0) *\n");
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let node = self.arena.get(id);
            let indent = "  ".repeat(depth);
            let marker = if node.is_terminal() { " *" } else { "" };

            let line = if id == self.root {
                format!("{}<root> ({})\n", indent, node.children.len())
            } else {
                format!(
                    "{}{:?} ({}){}\n",
                    indent,
                    String::from_utf8_lossy(&node.label),
                    node.children.len(),
                    marker
                )
            };
            out.push_str(&line);

            let mut children: Vec<(u8, NodeId)> =
                node.children.iter().map(|(&byte, &child)| (byte, child)).collect();
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            stack.extend(children.into_iter().map(|(_, child)| (child, depth + 1)));
        }

        out
    }

    /// Walks the whole tree and verifies its structural invariants.
    ///
    /// A correct tree always passes; a failure indicates a defect in this
    /// crate, not in the caller.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let root = self.arena.get(self.root);
        if !root.label.is_empty() {
            return Err(InvariantViolation::RootLabel);
        }
        if root.value.is_some() {
            return Err(InvariantViolation::RootPayload);
        }
        if root.parent.is_some() {
            return Err(InvariantViolation::RootParent);
        }

        let mut reachable = 0;
        let mut terminals = 0;
        let mut stack = vec![(self.root, Vec::new())];

        while let Some((id, key)) = stack.pop() {
            let node = self.arena.get(id);
            reachable += 1;
            if node.is_terminal() {
                terminals += 1;
            }

            if id != self.root && !node.is_terminal() {
                match node.children.len() {
                    0 => return Err(InvariantViolation::NonTerminalLeaf { key }),
                    1 => return Err(InvariantViolation::SingleChildBranch { key }),
                    _ => {}
                }
            }

            for (&byte, &child_id) in &node.children {
                let child = self.arena.get(child_id);
                let mut child_key = key.clone();
                child_key.extend_from_slice(&child.label);

                match child.label.first() {
                    None => return Err(InvariantViolation::EmptyLabel { key }),
                    Some(&first) if first != byte => {
                        return Err(InvariantViolation::ChildKeyMismatch { key: child_key })
                    }
                    Some(_) => {}
                }
                if child.parent != Some(id) {
                    return Err(InvariantViolation::ParentMismatch { key: child_key });
                }

                stack.push((child_id, child_key));
            }
        }

        if terminals != self.size {
            return Err(InvariantViolation::CountMismatch {
                expected: self.size,
                found: terminals,
            });
        }
        if reachable != self.arena.len() {
            return Err(InvariantViolation::UnreachableNodes {
                live: self.arena.len(),
                reachable,
            });
        }
        Ok(())
    }

    /// Returns the terminal node storing exactly `key`.
    fn find(&self, key: &[u8]) -> Option<NodeId> {
        let m = traverse(&self.arena, self.root, key);
        if m.ends_at_node(&self.arena, key) && self.arena.get(m.node).is_terminal() {
            Some(m.node)
        } else {
            None
        }
    }

    /// Concatenates the labels from the root down to `id`.
    pub(crate) fn path_to(&self, id: NodeId) -> Vec<u8> {
        let mut labels = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.arena.get(current);
            labels.push(&node.label[..]);
            cursor = node.parent;
        }
        labels.into_iter().rev().flatten().copied().collect()
    }
}

impl<V> Drop for RadixTree<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// Default implementation
impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(key, value)| (String::from_utf8_lossy(&key).into_owned(), value)),
            )
            .finish()
    }
}

impl<'a, V> IntoIterator for &'a RadixTree<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
