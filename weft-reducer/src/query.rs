//! Explicit accessors over the weave's bot/tag/value structure.
//!
//! These are the only read paths the core exposes: no implicit
//! computed-property indirection. The reducer and the event layer both
//! resolve entities through here, so duplicate atoms (two live `Bot`
//! atoms sharing an id, two `Tag` atoms sharing a name) are settled the
//! same deterministic way everywhere: the first in weave order wins.

use weft_core::{AtomId, WeftOp};
use weft_text::{compose, visible_text};
use weft_weave::{NodeIndex, Weave};

use crate::state::TagValue;

/// The defining root atom of a live bot: the first non-tombstoned
/// root `Bot` atom with this id, in weave order.
pub fn bot_root(weave: &Weave, bot_id: &str) -> Option<NodeIndex> {
    weave.roots().find(|&root| {
        let Some(node) = weave.get_node(root) else {
            return false;
        };
        matches!(&node.atom.op, WeftOp::Bot { id } if id == bot_id) && !weave.is_tombstoned(root)
    })
}

/// The tag atom that claims `name` under a bot: the first `Tag` child
/// with that name, in sibling order.
pub fn tag_atom(weave: &Weave, bot: NodeIndex, name: &str) -> Option<NodeIndex> {
    weave.children(bot).find(|&child| {
        let Some(node) = weave.get_node(child) else {
            return false;
        };
        matches!(&node.atom.op, WeftOp::Tag { name: tag } if tag == name)
    })
}

/// The root `TagMask` atom that claims `(bot, tag)`: the first
/// non-tombstoned one in weave order.
pub fn mask_root(weave: &Weave, bot_id: &str, tag_name: &str) -> Option<NodeIndex> {
    weave.roots().find(|&root| {
        let Some(node) = weave.get_node(root) else {
            return false;
        };
        matches!(&node.atom.op, WeftOp::TagMask { bot, tag } if bot == bot_id && tag == tag_name)
            && !weave.is_tombstoned(root)
    })
}

/// The live value node under a tag or mask atom: the first
/// non-tombstoned `Value` child.
pub fn live_value(weave: &Weave, parent: NodeIndex) -> Option<NodeIndex> {
    weave.children(parent).find(|&child| {
        let Some(node) = weave.get_node(child) else {
            return false;
        };
        node.atom.op.is_value() && !weave.is_tombstoned(child)
    })
}

/// The id of the live value atom for a bot's tag, the anchor for text
/// edits.
pub fn tag_value_atom(weave: &Weave, bot_id: &str, tag_name: &str) -> Option<AtomId> {
    let bot = bot_root(weave, bot_id)?;
    let tag = tag_atom(weave, bot, tag_name)?;
    let value = live_value(weave, tag)?;
    weave.get_node(value).map(|node| node.atom.id.clone())
}

/// The effective value under a tag or mask atom.
///
/// String values are composed through their edit group so pending
/// inserts and deletes are reflected; everything else is the raw
/// payload. `None` when no live value exists. A JSON `null` payload is
/// returned as-is — callers treat it as unset.
pub fn effective_value(weave: &Weave, parent: NodeIndex) -> Option<TagValue> {
    let value = live_value(weave, parent)?;
    let node = weave.get_node(value)?;
    match &node.atom.op {
        WeftOp::Value {
            value: serde_json::Value::String(text),
        } => match compose(weave, &node.atom.id) {
            Ok(segments) => Some(TagValue::String(visible_text(&segments))),
            Err(_) => Some(TagValue::String(text.clone())),
        },
        WeftOp::Value { value } => Some(value.clone()),
        _ => None,
    }
}

/// The composed visible text of a bot's tag, if its value is a string.
pub fn tag_text(weave: &Weave, bot_id: &str, tag_name: &str) -> Option<String> {
    let bot = bot_root(weave, bot_id)?;
    let tag = tag_atom(weave, bot, tag_name)?;
    match effective_value(weave, tag)? {
        TagValue::String(text) => Some(text),
        _ => None,
    }
}
