//! High-level bot events and their application.
//!
//! Events are what consumers (UI, runtimes) speak; applying one authors
//! the corresponding atoms through the tree's site clock and folds the
//! structural results back into the projection. Text events resolve
//! their logical indices through the composer under the tree's current
//! version vector, so an edit always attaches relative to the state
//! this replica actually saw.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use weft_core::errors::ReducerError;
use weft_core::{AtomId, WeftOp, WeftResult};
use weft_text::{find_edit_position, find_edit_positions};
use weft_weave::{CausalTree, Weave, WeaveResult};

use crate::query;
use crate::reducer::WeftReducer;
use crate::state::{BotsState, TagValue};
use crate::updates::StateUpdates;

/// A consumer-level mutation of the projected state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    /// Create a bot with an initial tag map. A no-op when a live bot
    /// with this id already exists.
    AddBot {
        id: String,
        #[serde(default)]
        tags: BTreeMap<String, TagValue>,
    },
    /// Remove a bot and its whole causal group. A no-op when no live
    /// bot exists.
    RemoveBot { id: String },
    /// Write tag values on an existing bot. A `null` value unsets the
    /// tag. Writes equal to the current effective value are dropped.
    UpdateBot {
        id: String,
        tags: BTreeMap<String, TagValue>,
    },
    /// Write a tag mask keyed `(bot, tag)`, independent of whether the
    /// bot exists. `null` unsets the mask.
    UpdateTagMask {
        bot: String,
        tag: String,
        value: TagValue,
    },
    /// Splice text into a tag's string value at a logical index.
    InsertIntoTagValue {
        bot: String,
        tag: String,
        index: usize,
        text: String,
    },
    /// Delete `count` characters of a tag's string value starting at a
    /// logical index.
    DeleteFromTagValue {
        bot: String,
        tag: String,
        index: usize,
        count: usize,
    },
}

/// Apply a batch of events to the tree and fold the structural results
/// into the projection, returning one merged delta for the whole batch.
pub fn apply_events(
    tree: &mut CausalTree,
    events: &[BotEvent],
    state: &mut BotsState,
) -> WeftResult<StateUpdates> {
    let mut results: Vec<WeaveResult> = Vec::new();

    for event in events {
        match event {
            BotEvent::AddBot { id, tags } => {
                if query::bot_root(tree.weave(), id).is_some() {
                    continue;
                }
                debug!(bot = %id, tags = tags.len(), "adding bot");
                let bot = tree.create_atom(None, WeftOp::bot(id));
                let bot_id = bot.id.clone();
                results.push(tree.add(bot)?);
                for (tag, value) in tags {
                    if value.is_null() {
                        continue;
                    }
                    let tag_atom = tree.create_atom(Some(bot_id.clone()), WeftOp::tag(tag));
                    let tag_id = tag_atom.id.clone();
                    results.push(tree.add(tag_atom)?);
                    let value_atom =
                        tree.create_atom(Some(tag_id), WeftOp::value(value.clone()));
                    results.push(tree.add(value_atom)?);
                }
            }

            BotEvent::RemoveBot { id } => {
                let target = query::bot_root(tree.weave(), id)
                    .and_then(|root| tree.weave().get_node(root))
                    .map(|node| node.atom.id.clone());
                if let Some(target) = target {
                    debug!(bot = %id, "removing bot");
                    results.push(tree.remove(&target)?);
                }
            }

            BotEvent::UpdateBot { id, tags } => {
                let Some(root) = query::bot_root(tree.weave(), id) else {
                    continue;
                };
                let Some(bot_id) = tree
                    .weave()
                    .get_node(root)
                    .map(|node| node.atom.id.clone())
                else {
                    continue;
                };
                for (tag, value) in tags {
                    let existing_tag = query::tag_atom(tree.weave(), root, tag);
                    let current = existing_tag
                        .and_then(|index| query::effective_value(tree.weave(), index))
                        .filter(|value| !value.is_null());
                    let next = (!value.is_null()).then(|| value.clone());
                    if current == next {
                        continue;
                    }
                    let tag_id = match existing_tag
                        .and_then(|index| tree.weave().get_node(index))
                        .map(|node| node.atom.id.clone())
                    {
                        Some(tag_id) => tag_id,
                        None => {
                            let tag_atom =
                                tree.create_atom(Some(bot_id.clone()), WeftOp::tag(tag));
                            let tag_id = tag_atom.id.clone();
                            results.push(tree.add(tag_atom)?);
                            tag_id
                        }
                    };
                    let value_atom = tree.create_atom(Some(tag_id), WeftOp::value(value.clone()));
                    results.push(tree.add(value_atom)?);
                }
            }

            BotEvent::UpdateTagMask { bot, tag, value } => {
                let existing_mask = query::mask_root(tree.weave(), bot, tag);
                let current = existing_mask
                    .and_then(|index| query::effective_value(tree.weave(), index))
                    .filter(|value| !value.is_null());
                let next = (!value.is_null()).then(|| value.clone());
                if current == next {
                    continue;
                }
                let mask_id = match existing_mask
                    .and_then(|index| tree.weave().get_node(index))
                    .map(|node| node.atom.id.clone())
                {
                    Some(mask_id) => mask_id,
                    None => {
                        let mask_atom = tree.create_atom(None, WeftOp::tag_mask(bot, tag));
                        let mask_id = mask_atom.id.clone();
                        results.push(tree.add(mask_atom)?);
                        mask_id
                    }
                };
                let value_atom = tree.create_atom(Some(mask_id), WeftOp::value(value.clone()));
                results.push(tree.add(value_atom)?);
            }

            BotEvent::InsertIntoTagValue {
                bot,
                tag,
                index,
                text,
            } => {
                let value_id = edit_anchor(tree.weave(), bot, tag)?;
                let position =
                    find_edit_position(tree.weave(), &value_id, tree.version(), *index)?;
                let insert = tree.create_atom(
                    Some(position.id),
                    WeftOp::insert(position.offset, text.clone()),
                );
                results.push(tree.add(insert)?);
            }

            BotEvent::DeleteFromTagValue {
                bot,
                tag,
                index,
                count,
            } => {
                let value_id = edit_anchor(tree.weave(), bot, tag)?;
                let ranges =
                    find_edit_positions(tree.weave(), &value_id, tree.version(), *index, *count)?;
                for range in ranges {
                    let delete = tree.create_atom(
                        Some(range.position.id),
                        WeftOp::delete(
                            range.position.offset,
                            range.position.offset + range.count,
                        ),
                    );
                    results.push(tree.add(delete)?);
                }
            }
        }
    }

    Ok(WeftReducer::update(tree, &results, state))
}

/// The live value atom a text edit must anchor under.
fn edit_anchor(weave: &Weave, bot: &str, tag: &str) -> WeftResult<AtomId> {
    if query::bot_root(weave, bot).is_none() {
        return Err(ReducerError::UnknownBot { id: bot.to_string() }.into());
    }
    query::tag_value_atom(weave, bot, tag).ok_or_else(|| {
        ReducerError::MissingTagValue {
            bot: bot.to_string(),
            tag: tag.to_string(),
        }
        .into()
    })
}
