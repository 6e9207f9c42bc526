//! Entity-level deltas emitted by the reducer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One bot's changed tag names, merged across a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotUpdate {
    pub bot: String,
    pub tags: BTreeSet<String>,
}

/// The entity-level delta for one batch of weave results.
///
/// Multiple tag updates to the same bot in one batch are merged into a
/// single entry, so observers see one consistent update per entity
/// rather than one per atom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdates {
    pub added_bots: Vec<String>,
    pub removed_bots: Vec<String>,
    pub updated_bots: Vec<BotUpdate>,
}

impl StateUpdates {
    /// Whether the batch changed nothing visible.
    pub fn is_empty(&self) -> bool {
        self.added_bots.is_empty() && self.removed_bots.is_empty() && self.updated_bots.is_empty()
    }
}
