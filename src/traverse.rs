//! Descent from the root along the edges matching a key.
//!
//! Lookup, insertion and deletion all start here. The walk never changes the
//! tree; everything it learns is returned as a [`Match`].

use crate::node::{Arena, NodeId};
use crate::util::prefix_match;

/// Where a key's descent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    /// The deepest node whose edge shares a prefix with the key
    pub node: NodeId,
    /// Key bytes consumed up to and including the part of `node`'s label that matched
    pub consumed: usize,
    /// Bytes of `node`'s label that matched
    pub edge: usize,
}

impl Match {
    /// Whether the key ends exactly at the end of `node`'s label.
    pub fn ends_at_node<V>(&self, arena: &Arena<V>, key: &[u8]) -> bool {
        self.consumed == key.len() && self.edge == arena.get(self.node).label.len()
    }
}

/// Walks down from `start` following the child whose label shares a prefix
/// with the rest of `key`.
///
/// Siblings never share a first byte, so at most one child qualifies at each
/// step. The walk descends only through fully matched labels while key bytes
/// remain.
pub(crate) fn traverse<V>(arena: &Arena<V>, start: NodeId, key: &[u8]) -> Match {
    let mut current = start;
    let mut consumed = 0;

    loop {
        let node = arena.get(current);
        let remaining = &key[consumed..];

        let child = match remaining.first().and_then(|byte| node.children.get(byte)) {
            Some(&child) => child,
            None => {
                return Match {
                    node: current,
                    consumed,
                    edge: node.label.len(),
                }
            }
        };

        let label = &arena.get(child).label;
        let matched = prefix_match(remaining, label);

        if matched == label.len() && matched < remaining.len() {
            consumed += matched;
            current = child;
            continue;
        }

        return Match {
            node: child,
            consumed: consumed + matched,
            edge: matched,
        };
    }
}
