//! The projected bot/tag/value state.
//!
//! A read-only cache over the weave: consumers must treat it as always
//! derivable (and re-derivable) from the atoms. Maps are `BTreeMap` so
//! iteration and serialization stay deterministic across replicas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The value held by a tag. JSON `null` is the explicit unset marker
/// and never appears in the projection.
pub type TagValue = serde_json::Value;

/// A projected entity: an id plus its tag → value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub tags: BTreeMap<String, TagValue>,
}

impl Bot {
    /// A bot with no tags yet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: BTreeMap::new(),
        }
    }
}

/// The full projection: live bots plus the tag-mask overlay.
///
/// Masks are keyed `(bot, tag)` independently of whether the bot
/// currently exists, and take precedence over the bot's own tag value
/// when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotsState {
    bots: BTreeMap<String, Bot>,
    masks: BTreeMap<String, BTreeMap<String, TagValue>>,
}

impl BotsState {
    /// An empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bot with the given id, if live.
    pub fn bot(&self, id: &str) -> Option<&Bot> {
        self.bots.get(id)
    }

    /// All live bots, in id order.
    pub fn bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.values()
    }

    /// Number of live bots.
    pub fn len(&self) -> usize {
        self.bots.len()
    }

    /// Whether no bots are live.
    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// The mask value for `(bot, tag)`, if one is set.
    pub fn mask(&self, bot: &str, tag: &str) -> Option<&TagValue> {
        self.masks.get(bot)?.get(tag)
    }

    /// The effective value of a bot's tag: the mask layer wins over the
    /// bot's own tag value.
    pub fn tag_value(&self, bot: &str, tag: &str) -> Option<&TagValue> {
        if self.bots.contains_key(bot) {
            self.mask(bot, tag)
                .or_else(|| self.bots.get(bot).and_then(|b| b.tags.get(tag)))
        } else {
            None
        }
    }

    /// The effective tag map of a live bot, mask layer applied.
    pub fn effective_tags(&self, bot: &str) -> Option<BTreeMap<String, TagValue>> {
        let base = self.bots.get(bot)?;
        let mut tags = base.tags.clone();
        if let Some(masks) = self.masks.get(bot) {
            for (tag, value) in masks {
                tags.insert(tag.clone(), value.clone());
            }
        }
        Some(tags)
    }

    pub(crate) fn set_bot(&mut self, bot: Bot) {
        self.bots.insert(bot.id.clone(), bot);
    }

    pub(crate) fn clear_bot(&mut self, id: &str) {
        self.bots.remove(id);
    }

    pub(crate) fn set_masks(&mut self, bot: &str, masks: BTreeMap<String, TagValue>) {
        if masks.is_empty() {
            self.masks.remove(bot);
        } else {
            self.masks.insert(bot.to_string(), masks);
        }
    }
}
