//! Structural results produced by weave mutations.
//!
//! Observers (the semantic reducer, derived indexes) consume these to
//! update their state without rescanning the weave.

use serde::{Deserialize, Serialize};

use weft_core::{Atom, AtomId};

/// One structural event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaveEvent {
    /// The atom was inserted at its deterministic position.
    AtomAdded { atom: Atom },
    /// An identical atom already existed; the insert was a no-op.
    AtomAlreadyPresent { atom: Atom },
    /// The atom was physically pruned. `previous` and `next` are the
    /// ids of its former siblings, enough context for observers to
    /// patch derived indexes.
    AtomRemoved {
        atom: Atom,
        previous: Option<AtomId>,
        next: Option<AtomId>,
    },
}

impl WeaveEvent {
    /// The atom the event is about.
    pub fn atom(&self) -> &Atom {
        match self {
            Self::AtomAdded { atom }
            | Self::AtomAlreadyPresent { atom }
            | Self::AtomRemoved { atom, .. } => atom,
        }
    }
}

/// All structural events caused by applying one input (an atom insert
/// or a removal): at most one `AtomAdded` plus any prunes it triggered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaveResult {
    pub events: Vec<WeaveEvent>,
}

impl WeaveResult {
    /// A result with no events (an idempotent no-op).
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_event(event: WeaveEvent) -> Self {
        Self {
            events: vec![event],
        }
    }

    /// Atoms added by this input.
    pub fn added(&self) -> impl Iterator<Item = &Atom> {
        self.events.iter().filter_map(|event| match event {
            WeaveEvent::AtomAdded { atom } => Some(atom),
            _ => None,
        })
    }

    /// Atoms pruned as a consequence of this input.
    pub fn removed(&self) -> impl Iterator<Item = &Atom> {
        self.events.iter().filter_map(|event| match event {
            WeaveEvent::AtomRemoved { atom, .. } => Some(atom),
            _ => None,
        })
    }

    /// Whether the input changed nothing.
    pub fn is_noop(&self) -> bool {
        self.events
            .iter()
            .all(|event| matches!(event, WeaveEvent::AtomAlreadyPresent { .. }))
    }
}
