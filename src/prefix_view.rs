//! Prefix view into a radix tree.
//!
//! This module provides the `PrefixView` type returned by
//! [`RadixTree::prefix`], giving access to every stored key that starts with
//! a given prefix.

use std::fmt;

use crate::iter::Iter;
use crate::node::NodeId;
use crate::RadixTree;

/// A borrowed view of the subtree holding every key that starts with a prefix.
///
/// The subtree root is the node whose edge contains the end of the prefix, so
/// the prefix may stop in the middle of that node's label. When that node is a
/// leaf, the view holds exactly one key.
///
/// # Examples
///
/// ```
/// use radix_mutable::RadixTree;
///
/// let mut tree = RadixTree::new();
/// tree.insert("hello", 1).unwrap();
/// tree.insert("help", 2).unwrap();
/// tree.insert("world", 3).unwrap();
///
/// let view = tree.prefix("hel").unwrap();
///
/// assert_eq!(view.len(), 2);
/// assert!(view.contains_key("hello"));
/// assert!(!view.contains_key("world"));
/// ```
pub struct PrefixView<'a, V> {
    /// The tree this view borrows from
    tree: &'a RadixTree<V>,

    /// The key prefix defining this view
    prefix: Vec<u8>,

    /// Root of the subtree holding the keys with this prefix
    node: NodeId,
}

impl<'a, V> PrefixView<'a, V> {
    pub(crate) fn new(tree: &'a RadixTree<V>, prefix: Vec<u8>, node: NodeId) -> Self {
        PrefixView { tree, prefix, node }
    }

    /// Returns the key prefix for this view.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the underlying tree.
    pub fn tree(&self) -> &'a RadixTree<V> {
        self.tree
    }

    /// Returns the number of keys in this view.
    pub fn len(&self) -> usize {
        let arena = &self.tree.arena;
        let mut count = 0;
        let mut stack = vec![self.node];

        while let Some(id) = stack.pop() {
            let node = arena.get(id);
            if node.is_terminal() {
                count += 1;
            }
            stack.extend(node.children.values().copied());
        }

        count
    }

    /// Returns whether this view holds no keys.
    ///
    /// Views are only handed out for prefixes of stored keys, so this is
    /// `false` for every view obtained from a tree.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether the subtree root is a leaf, i.e. the prefix selects a
    /// single key with no extensions.
    pub fn is_leaf(&self) -> bool {
        self.tree.arena.get(self.node).is_leaf()
    }

    /// Checks if the view contains a key.
    ///
    /// Only returns true if the key is in the tree and starts with the prefix.
    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Gets the value for a key if it exists in this prefix view.
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&'a V> {
        let key = key.as_ref();
        if !key.starts_with(&self.prefix) {
            return None;
        }
        self.tree.get(key).ok()
    }

    /// Returns an iterator over the entries of this view, in lexicographic
    /// key order.
    pub fn iter(&self) -> Iter<'a, V> {
        let arena = &self.tree.arena;
        let mut base = self.tree.path_to(self.node);
        let own = arena.get(self.node).label.len();
        base.truncate(base.len() - own);

        Iter::new(arena, self.node, base)
    }

    /// Returns an iterator over the keys of this view.
    pub fn keys(&self) -> impl Iterator<Item = Vec<u8>> + 'a {
        self.iter().map(|(key, _)| key)
    }
}

impl<V> Clone for PrefixView<'_, V> {
    fn clone(&self) -> Self {
        PrefixView {
            tree: self.tree,
            prefix: self.prefix.clone(),
            node: self.node,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for PrefixView<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixView")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, V> IntoIterator for &PrefixView<'a, V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, RadixTree};

    fn tree() -> RadixTree<u32> {
        let mut tree = RadixTree::new();
        tree.insert("hello", 1).unwrap();
        tree.insert("help", 2).unwrap();
        tree.insert("world", 3).unwrap();
        tree
    }

    #[test]
    fn test_view_mid_edge() {
        let tree = tree();

        // "he" stops inside the "hel" edge
        let view = tree.prefix("he").unwrap();
        assert_eq!(view.prefix(), b"he");
        assert_eq!(view.len(), 2);
        assert!(!view.is_leaf());
        assert_eq!(view.keys().collect::<Vec<_>>(), vec![b"hello".to_vec(), b"help".to_vec()]);
    }

    #[test]
    fn test_view_on_leaf() {
        let tree = tree();

        let view = tree.prefix("wor").unwrap();
        assert!(view.is_leaf());
        assert_eq!(view.len(), 1);
        assert_eq!(view.get("world"), Some(&3));
        assert_eq!(view.get("hello"), None);
    }

    #[test]
    fn test_view_missing_prefix() {
        let tree = tree();

        assert_eq!(tree.prefix("x").unwrap_err(), Error::NotFound);
        assert_eq!(tree.prefix("helium").unwrap_err(), Error::NotFound);
        assert_eq!(tree.prefix("worlds").unwrap_err(), Error::NotFound);
    }

    #[test]
    fn test_view_of_whole_key() {
        let tree = tree();

        let view = tree.prefix("help").unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.iter().next(), Some((b"help".to_vec(), &2)));
    }

    #[test]
    fn test_empty_prefix_views_everything() {
        let tree = tree();

        let view = tree.prefix("").unwrap();
        assert_eq!(view.len(), 3);

        let empty: RadixTree<u32> = RadixTree::new();
        assert_eq!(empty.prefix("").unwrap_err(), Error::NotFound);
    }
}
