//! # Radix Tree
//!
//! A mutable radix tree (compressed prefix trie) mapping byte-string keys to
//! owned values.
//!
//! Edges carry whole byte strings rather than single bytes. Inserting splits an
//! edge where a new key diverges from it, deleting merges a node with its only
//! remaining child, so that the tree stays minimal after every operation.
//!
//! ## Features
//!
//! - **Exact and prefix lookup**: find the value of a key, or view every key
//!   starting with a prefix
//! - **Destroy hook**: discarded values can be handed to a callback instead of
//!   being dropped
//! - **Fallible allocation**: a mutation that cannot allocate reports
//!   [`Error::OutOfMemory`] and leaves the tree untouched
//! - **`tracing` feature**: structural changes are reported as trace events
//!
//! ## Example
//!
//! ```rust
//! use radix_mutable::{Error, RadixTree};
//!
//! let mut tree = RadixTree::new();
//! tree.insert("toast", 1).unwrap();
//! tree.insert("toaster", 2).unwrap();
//!
//! assert_eq!(tree.get("toast"), Ok(&1));
//! assert_eq!(tree.insert("toast", 3), Err(Error::KeyConflict));
//!
//! let view = tree.prefix("toa").unwrap();
//! assert_eq!(view.keys().collect::<Vec<_>>(), vec![b"toast".to_vec(), b"toaster".to_vec()]);
//! ```

mod iter;
mod node;
mod prefix_view;
mod traverse;
mod tree;
mod util;

// Re-export public types
pub use crate::iter::Iter;
pub use crate::prefix_view::PrefixView;
pub use crate::tree::RadixTree;

use std::collections::TryReserveError;
use std::fmt;

/// Errors that can occur in tree operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Key is invalid for the operation (keys must not be empty)
    InvalidKey,
    /// The key is already stored and replacing was not requested
    KeyConflict,
    /// No stored key matches
    NotFound,
    /// An allocation failed; the tree was left unchanged
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKey => write!(f, "Invalid key for this operation"),
            Error::KeyConflict => write!(f, "Key is already present"),
            Error::NotFound => write!(f, "Key not found"),
            Error::OutOfMemory => write!(f, "Out of memory"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/// A broken structural invariant.
///
/// These indicate a defect in the tree itself, never a caller error. They are
/// returned by [`RadixTree::check_invariants`]; when one is detected during an
/// operation the process panics instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root has a non-empty label
    RootLabel,
    /// The root holds a value
    RootPayload,
    /// The root has a parent
    RootParent,
    /// A non-root node has an empty label
    EmptyLabel { key: Vec<u8> },
    /// A child is filed under a byte other than its label's first byte
    ChildKeyMismatch { key: Vec<u8> },
    /// Two siblings would start with the same byte
    SiblingConflict { byte: u8 },
    /// A node's parent link does not point at the node owning it
    ParentMismatch { key: Vec<u8> },
    /// A non-terminal node other than the root has exactly one child
    SingleChildBranch { key: Vec<u8> },
    /// A non-terminal node other than the root has no children
    NonTerminalLeaf { key: Vec<u8> },
    /// The number of stored keys disagrees with the number of terminal nodes
    CountMismatch { expected: usize, found: usize },
    /// The arena holds nodes that are not reachable from the root
    UnreachableNodes { live: usize, reachable: usize },
    /// An id refers to a released node
    DanglingNode,
    /// A node expected to have a parent has none
    DetachedNode,
    /// Attempt to free a node that still has children
    FreeNonLeaf,
    /// Attempt to merge a node that holds a value
    MergeWithPayload,
    /// Attempt to merge a node that does not have exactly one child
    MergeWithoutSoleChild { children: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lossy = |key: &[u8]| String::from_utf8_lossy(key).into_owned();
        match self {
            InvariantViolation::RootLabel => write!(f, "root has a label"),
            InvariantViolation::RootPayload => write!(f, "root holds a value"),
            InvariantViolation::RootParent => write!(f, "root has a parent"),
            InvariantViolation::EmptyLabel { key } => {
                write!(f, "empty label below {:?}", lossy(key))
            }
            InvariantViolation::ChildKeyMismatch { key } => {
                write!(f, "child {:?} filed under the wrong byte", lossy(key))
            }
            InvariantViolation::SiblingConflict { byte } => {
                write!(f, "two siblings start with byte {:#04x}", byte)
            }
            InvariantViolation::ParentMismatch { key } => {
                write!(f, "node {:?} has a stale parent link", lossy(key))
            }
            InvariantViolation::SingleChildBranch { key } => {
                write!(f, "branch {:?} has a single child", lossy(key))
            }
            InvariantViolation::NonTerminalLeaf { key } => {
                write!(f, "leaf {:?} holds no value", lossy(key))
            }
            InvariantViolation::CountMismatch { expected, found } => {
                write!(f, "expected {} keys, found {}", expected, found)
            }
            InvariantViolation::UnreachableNodes { live, reachable } => {
                write!(f, "{} live nodes but only {} reachable", live, reachable)
            }
            InvariantViolation::DanglingNode => write!(f, "dangling node id"),
            InvariantViolation::DetachedNode => write!(f, "node has no parent"),
            InvariantViolation::FreeNonLeaf => write!(f, "freeing a node with children"),
            InvariantViolation::MergeWithPayload => write!(f, "merging a node that holds a value"),
            InvariantViolation::MergeWithoutSoleChild { children } => {
                write!(f, "merging a node with {} children", children)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[cold]
#[track_caller]
pub(crate) fn violated(violation: InvariantViolation) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(%violation, "radix tree invariant violated");

    panic!("radix tree invariant violated: {}", violation)
}
