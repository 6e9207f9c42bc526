//! The weave: a causal tree flattened into a deterministic total order.
//!
//! Nodes live in an arena ([`crate::node`]) in depth-first preorder of
//! the causal tree. Sibling placement uses the weave order of
//! [`weft_core::AtomId`], so concurrent atoms under the same cause land
//! in the same position on every replica regardless of arrival order.
//!
//! Two secondary indexes keep lookups O(1)-class: a per-site **yarn**
//! (`site → timestamp → node`) and a content-hash index used by
//! remote-removal protocols that address atoms by hash.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, trace};

use weft_core::errors::WeaveError;
use weft_core::{Atom, AtomId, SiteId, Timestamp, WeftResult};

use crate::node::{NodeIndex, Slot, WeaveNode};
use crate::result::WeaveEvent;

/// Ordered causal tree of atoms.
///
/// # Examples
///
/// ```
/// use weft_core::{Atom, AtomId, SiteId, WeftOp};
/// use weft_weave::Weave;
///
/// let site = SiteId::new("a");
/// let mut weave = Weave::new();
/// let bot = Atom::root(AtomId::new(site.clone(), 1), WeftOp::bot("test"));
/// weave.insert(bot.clone()).unwrap();
/// weave
///     .insert(Atom::new(
///         AtomId::new(site, 2),
///         Some(bot.id.clone()),
///         WeftOp::tag("color"),
///     ))
///     .unwrap();
/// assert_eq!(weave.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Weave {
    slots: Vec<Slot>,
    free_head: Option<NodeIndex>,
    first_root: Option<NodeIndex>,
    len: usize,
    yarns: HashMap<SiteId, HashMap<Timestamp, NodeIndex>>,
    hashes: HashMap<String, NodeIndex>,
}

impl Weave {
    /// An empty weave.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live atoms.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the weave holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rebuild a weave from a previously exported, weave-ordered atom
    /// array. Reproduces the exact order `atoms()` would have produced
    /// had each atom been inserted one at a time in creation order.
    pub fn from_atoms(atoms: impl IntoIterator<Item = Atom>) -> WeftResult<Self> {
        let mut weave = Self::new();
        for atom in atoms {
            weave.insert(atom)?;
        }
        Ok(weave)
    }

    // ─── Lookup ──────────────────────────────────────────────────────

    /// Arena index of the node for `id`, via the yarn index.
    pub fn get_index(&self, id: &AtomId) -> Option<NodeIndex> {
        let index = *self.yarns.get(&id.site)?.get(&id.timestamp)?;
        (self.node(index).atom.id == *id).then_some(index)
    }

    /// The node for `id`.
    pub fn get(&self, id: &AtomId) -> Option<&WeaveNode> {
        self.get_index(id).map(|index| self.node(index))
    }

    /// The node at an arena index, `None` if the index is stale.
    pub fn get_node(&self, index: NodeIndex) -> Option<&WeaveNode> {
        match self.slots.get(index.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// The node whose atom has the given content hash.
    pub fn get_by_hash(&self, hash: &str) -> Option<&WeaveNode> {
        self.hashes.get(hash).map(|&index| self.node(index))
    }

    /// Children of a node, in weave (sibling) order.
    pub fn children(&self, index: NodeIndex) -> ChildIndices<'_> {
        ChildIndices {
            weave: self,
            next: self.get_node(index).and_then(|node| node.first_child),
        }
    }

    /// Root nodes, in weave (sibling) order.
    pub fn roots(&self) -> ChildIndices<'_> {
        ChildIndices {
            weave: self,
            next: self.first_root,
        }
    }

    /// All atoms in weave order (depth-first preorder).
    pub fn atoms(&self) -> Atoms<'_> {
        Atoms {
            weave: self,
            next: self.first_root,
        }
    }

    /// Whether the node's subtree is marked removed: its first child is
    /// a subtree tombstone. Tombstones carry a raised priority, so when
    /// one exists it always sorts first.
    pub fn is_tombstoned(&self, index: NodeIndex) -> bool {
        self.get_node(index)
            .and_then(|node| node.first_child)
            .map(|child| self.node(child).atom.op.is_tombstone())
            .unwrap_or(false)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Insert an atom at its deterministic position among the children
    /// of its cause.
    ///
    /// Re-inserting an atom that already exists is an idempotent no-op
    /// (`AtomAlreadyPresent`), never an error: duplicate delivery is a
    /// correctness requirement of replication, not an edge case.
    /// An unknown cause fails with [`WeaveError::DanglingCause`].
    pub fn insert(&mut self, atom: Atom) -> WeftResult<WeaveEvent> {
        if self.get_index(&atom.id).is_some() {
            trace!(id = %atom.id, "duplicate insert ignored");
            return Ok(WeaveEvent::AtomAlreadyPresent { atom });
        }

        let parent = match &atom.cause {
            Some(cause) => Some(self.get_index(cause).ok_or_else(|| WeaveError::DanglingCause {
                atom: atom.id.clone(),
                cause: cause.clone(),
            })?),
            None => None,
        };

        let hash = atom.content_hash()?;
        let (prev, next) = self.sibling_position(parent, &atom.id);
        let id = atom.id.clone();

        let index = self.alloc(WeaveNode {
            atom,
            hash: hash.clone(),
            parent,
            first_child: None,
            prev_sibling: prev,
            next_sibling: next,
        });

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(index),
            None => match parent {
                Some(parent) => self.node_mut(parent).first_child = Some(index),
                None => self.first_root = Some(index),
            },
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = Some(index);
        }

        self.yarns
            .entry(id.site.clone())
            .or_default()
            .insert(id.timestamp, index);
        self.hashes.insert(hash, index);
        self.len += 1;

        debug!(id = %id, "atom inserted");
        Ok(WeaveEvent::AtomAdded {
            atom: self.node(index).atom.clone(),
        })
    }

    /// Physically prune a subtree, root included. Emits one
    /// `AtomRemoved` per pruned node, in preorder, each carrying its
    /// former previous/next sibling ids.
    pub fn remove_subtree(&mut self, root: NodeIndex) -> Vec<WeaveEvent> {
        if self.get_node(root).is_none() {
            return Vec::new();
        }

        let indices = self.collect_subtree(root);
        let mut events = Vec::with_capacity(indices.len());
        for &index in &indices {
            let node = self.node(index);
            events.push(WeaveEvent::AtomRemoved {
                atom: node.atom.clone(),
                previous: node
                    .prev_sibling
                    .map(|sibling| self.node(sibling).atom.id.clone()),
                next: node
                    .next_sibling
                    .map(|sibling| self.node(sibling).atom.id.clone()),
            });
        }

        self.unlink(root);
        for index in indices {
            self.release(index);
        }
        debug!(count = events.len(), "subtree pruned");
        events
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn node(&self, index: NodeIndex) -> &WeaveNode {
        match &self.slots[index.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("stale weave index {index:?}"),
        }
    }

    fn node_mut(&mut self, index: NodeIndex) -> &mut WeaveNode {
        match &mut self.slots[index.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("stale weave index {index:?}"),
        }
    }

    /// Find the siblings a new atom lands between: scan the cause's
    /// children and stop at the first existing child the new id sorts
    /// before. Children therefore always sit in weave order, however
    /// they arrive.
    fn sibling_position(
        &self,
        parent: Option<NodeIndex>,
        id: &AtomId,
    ) -> (Option<NodeIndex>, Option<NodeIndex>) {
        let mut cursor = match parent {
            Some(parent) => self.node(parent).first_child,
            None => self.first_root,
        };
        let mut prev = None;
        while let Some(current) = cursor {
            if id.weave_cmp(&self.node(current).atom.id) == Ordering::Less {
                break;
            }
            prev = Some(current);
            cursor = self.node(current).next_sibling;
        }
        (prev, cursor)
    }

    fn alloc(&mut self, node: WeaveNode) -> NodeIndex {
        match self.free_head {
            Some(index) => {
                let next_free = match self.slots[index.index()] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("occupied slot on free list"),
                };
                self.free_head = next_free;
                self.slots[index.index()] = Slot::Occupied(node);
                index
            }
            None => {
                let index = NodeIndex::new(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                index
            }
        }
    }

    /// Detach a node from its sibling chain (or the root chain).
    fn unlink(&mut self, index: NodeIndex) {
        let node = self.node(index);
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => match parent {
                Some(parent) => self.node_mut(parent).first_child = next,
                None => self.first_root = next,
            },
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }
    }

    /// Free a slot and drop its index entries.
    fn release(&mut self, index: NodeIndex) {
        let node = match std::mem::replace(
            &mut self.slots[index.index()],
            Slot::Vacant {
                next_free: self.free_head,
            },
        ) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("double release of weave index {index:?}"),
        };
        self.free_head = Some(index);

        if let Some(yarn) = self.yarns.get_mut(&node.atom.id.site) {
            yarn.remove(&node.atom.id.timestamp);
        }
        self.hashes.remove(&node.hash);
        self.len -= 1;
    }

    /// Subtree indices in preorder.
    fn collect_subtree(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            out.push(index);
            let mut children: Vec<NodeIndex> = self.children(index).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Preorder successor: first child, else next sibling, else the
    /// nearest ancestor's next sibling.
    fn successor(&self, index: NodeIndex) -> Option<NodeIndex> {
        if let Some(child) = self.node(index).first_child {
            return Some(child);
        }
        let mut current = index;
        loop {
            let node = self.node(current);
            if let Some(sibling) = node.next_sibling {
                return Some(sibling);
            }
            match node.parent {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }
}

/// Iterator over the children of one node, in sibling order.
pub struct ChildIndices<'a> {
    weave: &'a Weave,
    next: Option<NodeIndex>,
}

impl Iterator for ChildIndices<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.weave.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over all atoms in weave order.
pub struct Atoms<'a> {
    weave: &'a Weave,
    next: Option<NodeIndex>,
}

impl<'a> Iterator for Atoms<'a> {
    type Item = &'a Atom;

    fn next(&mut self) -> Option<&'a Atom> {
        let current = self.next?;
        self.next = self.weave.successor(current);
        Some(&self.weave.node(current).atom)
    }
}
