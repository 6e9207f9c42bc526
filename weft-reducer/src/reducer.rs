//! The semantic reducer: structural weave results in, entity deltas out.
//!
//! For every batch the reducer finds the bots whose causal groups were
//! touched, re-projects exactly those bots from the weave, and diffs
//! the result against the previous projection. Atoms with no `Bot` or
//! `TagMask` ancestor are tolerated by omission: they exist in the
//! weave but never surface here.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use weft_core::{Atom, WeftOp};
use weft_weave::{CausalTree, Weave, WeaveEvent, WeaveResult};

use crate::query;
use crate::state::{Bot, BotsState, TagValue};
use crate::updates::{BotUpdate, StateUpdates};

/// Stateless projection engine.
pub struct WeftReducer;

impl WeftReducer {
    /// Fold a batch of structural results into the projection and
    /// return the entity-level delta, merged per bot.
    pub fn update(
        tree: &CausalTree,
        results: &[WeaveResult],
        state: &mut BotsState,
    ) -> StateUpdates {
        let weave = tree.weave();

        let mut affected: BTreeSet<String> = BTreeSet::new();
        for result in results {
            for event in &result.events {
                match event {
                    WeaveEvent::AtomAdded { atom } | WeaveEvent::AtomRemoved { atom, .. } => {
                        if let Some(owner) = resolve_owner(weave, atom) {
                            affected.insert(owner);
                        }
                    }
                    WeaveEvent::AtomAlreadyPresent { .. } => {}
                }
            }
        }

        let mut updates = StateUpdates::default();
        for bot_id in affected {
            let old_view = state.effective_tags(&bot_id);

            let projected = project_bot(weave, &bot_id);
            state.set_masks(&bot_id, project_masks(weave, &bot_id));
            match projected {
                Some(bot) => state.set_bot(bot),
                None => state.clear_bot(&bot_id),
            }

            let new_view = state.effective_tags(&bot_id);
            match (old_view, new_view) {
                (None, Some(_)) => updates.added_bots.push(bot_id),
                (Some(_), None) => updates.removed_bots.push(bot_id),
                (Some(old), Some(new)) => {
                    let tags = changed_tags(&old, &new);
                    if !tags.is_empty() {
                        updates.updated_bots.push(BotUpdate { bot: bot_id, tags });
                    }
                }
                (None, None) => {}
            }
        }

        if !updates.is_empty() {
            debug!(
                added = updates.added_bots.len(),
                removed = updates.removed_bots.len(),
                updated = updates.updated_bots.len(),
                "projection updated"
            );
        }
        updates
    }
}

/// The bot whose causal group an atom belongs to.
///
/// Added atoms are resolved from their own node; pruned atoms from
/// their (still live) cause. Atoms under neither a `Bot` nor a
/// `TagMask` resolve to nothing.
fn resolve_owner(weave: &Weave, atom: &Atom) -> Option<String> {
    match &atom.op {
        WeftOp::Bot { id } => return Some(id.clone()),
        WeftOp::TagMask { bot, .. } => return Some(bot.clone()),
        _ => {}
    }
    let start = weave
        .get_index(&atom.id)
        .or_else(|| atom.cause.as_ref().and_then(|cause| weave.get_index(cause)))?;

    let mut current = Some(start);
    while let Some(index) = current {
        let node = weave.get_node(index)?;
        match &node.atom.op {
            WeftOp::Bot { id } => return Some(id.clone()),
            WeftOp::TagMask { bot, .. } => return Some(bot.clone()),
            _ => current = node.parent,
        }
    }
    None
}

/// Re-project one bot from the weave. `None` when no live defining
/// atom exists.
fn project_bot(weave: &Weave, bot_id: &str) -> Option<Bot> {
    let root = query::bot_root(weave, bot_id)?;
    let mut bot = Bot::new(bot_id);
    let mut claimed = BTreeSet::new();
    for child in weave.children(root) {
        let Some(node) = weave.get_node(child) else {
            continue;
        };
        let WeftOp::Tag { name } = &node.atom.op else {
            continue;
        };
        if !claimed.insert(name.clone()) {
            continue;
        }
        if let Some(value) = query::effective_value(weave, child) {
            if !value.is_null() {
                bot.tags.insert(name.clone(), value);
            }
        }
    }
    Some(bot)
}

/// Re-project the mask layer for one bot from the root `TagMask` atoms.
fn project_masks(weave: &Weave, bot_id: &str) -> BTreeMap<String, TagValue> {
    let mut masks = BTreeMap::new();
    let mut claimed = BTreeSet::new();
    for root in weave.roots() {
        let Some(node) = weave.get_node(root) else {
            continue;
        };
        let WeftOp::TagMask { bot, tag } = &node.atom.op else {
            continue;
        };
        if bot != bot_id || weave.is_tombstoned(root) {
            continue;
        }
        if !claimed.insert(tag.clone()) {
            continue;
        }
        if let Some(value) = query::effective_value(weave, root) {
            if !value.is_null() {
                masks.insert(tag.clone(), value);
            }
        }
    }
    masks
}

fn changed_tags(
    old: &BTreeMap<String, TagValue>,
    new: &BTreeMap<String, TagValue>,
) -> BTreeSet<String> {
    old.keys()
        .chain(new.keys())
        .filter(|tag| old.get(*tag) != new.get(*tag))
        .cloned()
        .collect()
}
