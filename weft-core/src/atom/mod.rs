//! The atom: the smallest immutable unit of replicated history.
//!
//! An atom couples a globally unique [`AtomId`], the id of its causal
//! parent (`None` for a root atom), and an operation payload. Atoms are
//! never mutated once created; a replica either retains them forever or
//! prunes them after tombstoning.

pub mod id;
pub mod op;

pub use id::{AtomId, Priority, SiteId, Timestamp};
pub use op::{OpKind, WeftOp};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::WeftResult;

/// An operation plus its causal parent.
///
/// `cause == None` marks a root atom. Once delivered, an atom's cause
/// must already exist in the weave; inserting an atom whose cause is
/// unknown fails with `DanglingCause`.
///
/// # Examples
///
/// ```
/// use weft_core::{Atom, AtomId, SiteId, WeftOp};
///
/// let site = SiteId::new("a");
/// let root = Atom::root(AtomId::new(site.clone(), 1), WeftOp::bot("test"));
/// let child = Atom::new(
///     AtomId::new(site, 2),
///     Some(root.id.clone()),
///     WeftOp::tag("color"),
/// );
/// assert_eq!(child.cause.as_ref(), Some(&root.id));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Globally unique identity of this atom.
    pub id: AtomId,
    /// The atom this one is causally attached to, `None` for roots.
    pub cause: Option<AtomId>,
    /// The operation payload. Pure data, no behavior. The wire shape
    /// names this field `value`.
    #[serde(rename = "value")]
    pub op: WeftOp,
}

impl Atom {
    /// Create a new atom.
    pub fn new(id: AtomId, cause: Option<AtomId>, op: WeftOp) -> Self {
        Self { id, cause, op }
    }

    /// Create a root atom (no cause).
    pub fn root(id: AtomId, op: WeftOp) -> Self {
        Self {
            id,
            cause: None,
            op,
        }
    }

    /// Compare two atoms in weave order: causes first (same rule),
    /// own ids only when the causes match. Roots sort before caused
    /// atoms.
    pub fn weave_cmp(&self, other: &Self) -> Ordering {
        match (&self.cause, &other.cause) {
            (None, None) => self.id.weave_cmp(&other.id),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.weave_cmp(b).then_with(|| self.id.weave_cmp(&other.id)),
        }
    }

    /// Content hash of this atom: blake3 over the canonical serialized
    /// form. Used by the hash index and remove-by-hash protocols.
    pub fn content_hash(&self) -> WeftResult<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
