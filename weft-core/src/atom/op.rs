//! Operation payloads carried by atoms.
//!
//! Ops are pure data; what they *mean* is decided by the semantic
//! reducer and the text composer, never here. The `Custom` variant is
//! the extension point for entity-specific operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed operation. Serialized with a `type`/`data` tag pair so the
/// wire shape stays readable in transports and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WeftOp {
    /// Declares an entity ("bot") with the given id.
    Bot { id: String },
    /// Declares a tag on the causally enclosing bot.
    Tag { name: String },
    /// A value written under a tag or tag mask. A JSON `null` payload
    /// is the explicit "unset" marker.
    Value { value: serde_json::Value },
    /// A tag value keyed by `(bot, tag)`, layered over the bot's own
    /// tag value when both exist.
    TagMask { bot: String, tag: String },
    /// Splices `text` at a logical character index of the cause's text.
    Insert { index: usize, text: String },
    /// With a range: marks `[start, end)` of the cause's text deleted.
    /// Rangeless: a tombstone for the cause's entire subtree.
    Delete {
        start: Option<usize>,
        end: Option<usize>,
    },
    /// Extension point for entity-specific operations.
    Custom {
        kind: String,
        data: serde_json::Value,
    },
}

impl WeftOp {
    /// A `Bot` op.
    pub fn bot(id: impl Into<String>) -> Self {
        Self::Bot { id: id.into() }
    }

    /// A `Tag` op.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag { name: name.into() }
    }

    /// A `Value` op.
    pub fn value(value: serde_json::Value) -> Self {
        Self::Value { value }
    }

    /// A `TagMask` op.
    pub fn tag_mask(bot: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::TagMask {
            bot: bot.into(),
            tag: tag.into(),
        }
    }

    /// An `Insert` op.
    pub fn insert(index: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            index,
            text: text.into(),
        }
    }

    /// A ranged `Delete` op marking `[start, end)` of the cause's text.
    pub fn delete(start: usize, end: usize) -> Self {
        Self::Delete {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A rangeless `Delete`: the subtree tombstone.
    pub fn tombstone() -> Self {
        Self::Delete {
            start: None,
            end: None,
        }
    }

    /// The op's kind, for dispatch and error reporting.
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Bot { .. } => OpKind::Bot,
            Self::Tag { .. } => OpKind::Tag,
            Self::Value { .. } => OpKind::Value,
            Self::TagMask { .. } => OpKind::TagMask,
            Self::Insert { .. } => OpKind::Insert,
            Self::Delete { .. } => OpKind::Delete,
            Self::Custom { .. } => OpKind::Custom,
        }
    }

    /// Whether this op is a rangeless `Delete`, i.e. a subtree
    /// tombstone rather than a text deletion.
    pub fn is_tombstone(&self) -> bool {
        matches!(
            self,
            Self::Delete {
                start: None,
                end: None
            }
        )
    }

    /// Whether this op is a `Value`.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}

/// Discriminant-only view of [`WeftOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Bot,
    Tag,
    Value,
    TagMask,
    Insert,
    Delete,
    Custom,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bot => "bot",
            Self::Tag => "tag",
            Self::Value => "value",
            Self::TagMask => "tag_mask",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tombstone_is_a_rangeless_delete() {
        assert!(WeftOp::tombstone().is_tombstone());
        assert!(!WeftOp::delete(0, 1).is_tombstone());
    }

    #[test]
    fn ops_round_trip_through_json() {
        let ops = vec![
            WeftOp::bot("b1"),
            WeftOp::tag("color"),
            WeftOp::value(json!("red")),
            WeftOp::value(json!(null)),
            WeftOp::tag_mask("b1", "color"),
            WeftOp::insert(3, "X"),
            WeftOp::delete(0, 1),
            WeftOp::tombstone(),
            WeftOp::Custom {
                kind: "checkpoint".to_string(),
                data: json!({"seq": 9}),
            },
        ];
        for op in ops {
            let json = serde_json::to_string(&op).unwrap();
            let back: WeftOp = serde_json::from_str(&json).unwrap();
            assert_eq!(op, back);
        }
    }

    #[test]
    fn tagged_representation_names_the_kind() {
        let json = serde_json::to_value(WeftOp::bot("b1")).unwrap();
        assert_eq!(json["type"], "bot");
        assert_eq!(json["data"]["id"], "b1");
    }
}
