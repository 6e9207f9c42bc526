//! The causal tree: a weave plus the replica-local bookkeeping that
//! makes it a unit of replication.
//!
//! Couples the weave with this replica's [`SiteStatus`] and a
//! [`VersionVector`], and runs garbage collection synchronously as part
//! of applying the update that supersedes a subtree, never on a timer.
//! This bounds memory per tag to "latest value + pending concurrent
//! edits".
//!
//! The tree is single-threaded and synchronous: every insert, removal,
//! and GC pass runs to completion before the next input is accepted.
//! Callers needing in-process parallelism must serialize access.

use tracing::debug;

use weft_core::constants::{DEFAULT_PRIORITY, TOMBSTONE_PRIORITY};
use weft_core::errors::WeaveError;
use weft_core::{
    Atom, AtomId, Priority, SiteId, SiteStatus, TreeConfig, VersionVector, WeftOp, WeftResult,
};

use crate::node::NodeIndex;
use crate::result::{WeaveEvent, WeaveResult};
use crate::weave::Weave;

/// A replica's causal tree: `(weave, site, version)`.
///
/// # Examples
///
/// ```
/// use weft_core::{SiteId, WeftOp};
/// use weft_weave::CausalTree;
///
/// let mut tree = CausalTree::new(SiteId::new("a"));
/// let bot = tree.create_atom(None, WeftOp::bot("test"));
/// let result = tree.add(bot).unwrap();
/// assert_eq!(result.added().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CausalTree {
    weave: Weave,
    site: SiteStatus,
    version: VersionVector,
    config: TreeConfig,
}

impl CausalTree {
    /// A fresh tree for the given site with the default config.
    pub fn new(site: SiteId) -> Self {
        Self::with_config(site, TreeConfig::default())
    }

    /// A fresh tree with an explicit config.
    pub fn with_config(site: SiteId, config: TreeConfig) -> Self {
        Self {
            weave: Weave::new(),
            site: SiteStatus::new(site),
            version: VersionVector::new(),
            config,
        }
    }

    /// The weave.
    pub fn weave(&self) -> &Weave {
        &self.weave
    }

    /// This replica's clock.
    pub fn site(&self) -> &SiteStatus {
        &self.site
    }

    /// Everything this replica has seen, per site.
    pub fn version(&self) -> &VersionVector {
        &self.version
    }

    /// The tree's configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The atom for `id`, if live.
    pub fn get_atom(&self, id: &AtomId) -> Option<&Atom> {
        self.weave.get(id).map(|node| &node.atom)
    }

    /// The atom with the given content hash, if live.
    pub fn get_atom_by_hash(&self, hash: &str) -> Option<&Atom> {
        self.weave.get_by_hash(hash).map(|node| &node.atom)
    }

    // ─── Authoring ───────────────────────────────────────────────────

    /// Stamp a new atom with this site's clock. The atom still has to
    /// be applied with [`CausalTree::add`].
    pub fn create_atom(&mut self, cause: Option<AtomId>, op: WeftOp) -> Atom {
        self.create_atom_with_priority(cause, op, DEFAULT_PRIORITY)
    }

    /// Stamp a new atom with an explicit priority.
    pub fn create_atom_with_priority(
        &mut self,
        cause: Option<AtomId>,
        op: WeftOp,
        priority: Priority,
    ) -> Atom {
        Atom::new(self.site.next_id(priority), cause, op)
    }

    // ─── Ingest ──────────────────────────────────────────────────────

    /// Apply one atom: insert into the weave, absorb it into the site
    /// clock and version vector, then garbage-collect whatever the
    /// insert made unreachable.
    pub fn add(&mut self, atom: Atom) -> WeftResult<WeaveResult> {
        let event = self.weave.insert(atom)?;
        let mut result = WeaveResult::from_event(event.clone());

        if let WeaveEvent::AtomAdded { atom } = event {
            self.site.observe(&atom.id);
            self.version.observe(&atom.id);
            if self.config.garbage_collect {
                self.collect_garbage(&atom, &mut result);
            }
        }
        Ok(result)
    }

    /// Apply a batch, one result per input. A failed input (typically a
    /// dangling cause the caller should buffer and re-request) does not
    /// abort the rest of the batch.
    pub fn add_many(
        &mut self,
        atoms: impl IntoIterator<Item = Atom>,
    ) -> Vec<WeftResult<WeaveResult>> {
        atoms.into_iter().map(|atom| self.add(atom)).collect()
    }

    /// Remove an atom's subtree: attach a tombstone under it, then
    /// prune the now-unreachable descendants. Removing an atom that is
    /// already tombstoned is a no-op.
    pub fn remove(&mut self, id: &AtomId) -> WeftResult<WeaveResult> {
        let index = self
            .weave
            .get_index(id)
            .ok_or_else(|| WeaveError::AtomNotFound { id: id.clone() })?;
        if self.weave.is_tombstoned(index) {
            return Ok(WeaveResult::empty());
        }
        let tombstone = self.create_atom_with_priority(
            Some(id.clone()),
            WeftOp::tombstone(),
            TOMBSTONE_PRIORITY,
        );
        debug!(atom = %id, tombstone = %tombstone.id, "removing subtree");
        self.add(tombstone)
    }

    /// Remove the atom with the given content hash.
    pub fn remove_by_hash(&mut self, hash: &str) -> WeftResult<WeaveResult> {
        let id = self
            .weave
            .get_by_hash(hash)
            .map(|node| node.atom.id.clone())
            .ok_or_else(|| WeaveError::HashNotFound {
                hash: hash.to_string(),
            })?;
        self.remove(&id)
    }

    /// Remove a batch by hash, one result per input.
    pub fn remove_many_by_hash(&mut self, hashes: &[String]) -> Vec<WeftResult<WeaveResult>> {
        hashes
            .iter()
            .map(|hash| self.remove_by_hash(hash))
            .collect()
    }

    // ─── Snapshots ───────────────────────────────────────────────────

    /// The weave's atom list in weave order.
    pub fn export(&self) -> Vec<Atom> {
        self.weave.atoms().cloned().collect()
    }

    /// Rebuild a tree from an exported atom list. No GC runs during
    /// import — the snapshot is already compacted, and the imported
    /// weave must reproduce the exporter's order and projection
    /// exactly.
    pub fn import(site: SiteId, atoms: impl IntoIterator<Item = Atom>) -> WeftResult<Self> {
        Self::import_with_config(site, atoms, TreeConfig::default())
    }

    /// [`CausalTree::import`] with an explicit config.
    pub fn import_with_config(
        site: SiteId,
        atoms: impl IntoIterator<Item = Atom>,
        config: TreeConfig,
    ) -> WeftResult<Self> {
        let mut tree = Self::with_config(site, config);
        for atom in atoms {
            if let WeaveEvent::AtomAdded { atom } = tree.weave.insert(atom)? {
                tree.site.observe(&atom.id);
                tree.version.observe(&atom.id);
            }
        }
        Ok(tree)
    }

    // ─── Garbage collection ──────────────────────────────────────────

    /// Prune whatever `added` made unreachable.
    ///
    /// Three triggers:
    /// - any atom landing under an already-tombstoned parent is
    ///   unreachable history and is pruned immediately;
    /// - a new `Value` under a `Tag`/`TagMask` supersedes every other
    ///   value lineage under that tag — only the first value child (the
    ///   winner of the weave order) survives;
    /// - a new tombstone compacts its parent: every non-tombstone child
    ///   subtree is pruned.
    fn collect_garbage(&mut self, added: &Atom, result: &mut WeaveResult) {
        let Some(index) = self.weave.get_index(&added.id) else {
            return;
        };

        if added.op.is_tombstone() {
            self.compact_tombstoned(index, result);
            return;
        }

        let parent = self.weave.get_node(index).and_then(|node| node.parent);
        if let Some(parent) = parent {
            if self.weave.is_tombstoned(parent) {
                result.events.extend(self.weave.remove_subtree(index));
                return;
            }
        }

        if added.op.is_value() {
            self.supersede_stale_values(index, result);
        }
    }

    /// Keep only the winning value lineage under the tag that just
    /// gained a value.
    fn supersede_stale_values(&mut self, value_index: NodeIndex, result: &mut WeaveResult) {
        let Some(parent) = self.weave.get_node(value_index).and_then(|node| node.parent) else {
            return;
        };
        let parent_op = match self.weave.get_node(parent) {
            Some(node) => &node.atom.op,
            None => return,
        };
        if !matches!(parent_op, WeftOp::Tag { .. } | WeftOp::TagMask { .. }) {
            return;
        }

        let values: Vec<NodeIndex> = self
            .weave
            .children(parent)
            .filter(|&child| {
                self.weave
                    .get_node(child)
                    .map(|node| node.atom.op.is_value())
                    .unwrap_or(false)
            })
            .collect();

        for &stale in values.iter().skip(1) {
            let events = self.weave.remove_subtree(stale);
            debug!(count = events.len(), "superseded value lineage pruned");
            result.events.extend(events);
        }
    }

    /// A tombstone arrived under `parent`: prune every child subtree
    /// that is not itself a tombstone (concurrent removals keep all
    /// their markers so replicas converge).
    fn compact_tombstoned(&mut self, tombstone_index: NodeIndex, result: &mut WeaveResult) {
        let Some(parent) = self
            .weave
            .get_node(tombstone_index)
            .and_then(|node| node.parent)
        else {
            return;
        };
        let stale: Vec<NodeIndex> = self
            .weave
            .children(parent)
            .filter(|&child| {
                self.weave
                    .get_node(child)
                    .map(|node| !node.atom.op.is_tombstone())
                    .unwrap_or(false)
            })
            .collect();
        for index in stale {
            result.events.extend(self.weave.remove_subtree(index));
        }
    }
}
