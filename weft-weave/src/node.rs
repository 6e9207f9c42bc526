//! Arena storage for weave nodes.
//!
//! Sibling and parent relationships are index-based links into a single
//! growable table rather than owning pointers, so pruning a subtree
//! never has to fight ownership cycles and neighbor lookup stays O(1)
//! after removal.

use serde::{Deserialize, Serialize};

use weft_core::Atom;

/// Index of a node in the weave's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena offset.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An atom plus its structural links.
///
/// The sibling chain is doubly linked so that removal can cheaply
/// report what used to be adjacent without renumbering anything.
#[derive(Debug, Clone)]
pub struct WeaveNode {
    /// The immutable atom this node wraps.
    pub atom: Atom,
    /// Content hash of the atom, cached for index maintenance.
    pub hash: String,
    /// The node for this atom's cause, `None` for roots.
    pub parent: Option<NodeIndex>,
    /// First child in sibling order.
    pub first_child: Option<NodeIndex>,
    /// Previous sibling under the same cause.
    pub prev_sibling: Option<NodeIndex>,
    /// Next sibling under the same cause.
    pub next_sibling: Option<NodeIndex>,
}

/// One arena slot: occupied by a node or vacant on the free list.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Occupied(WeaveNode),
    Vacant { next_free: Option<NodeIndex> },
}
