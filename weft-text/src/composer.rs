//! Composes a value atom's edit group into ordered segments.
//!
//! Each `Insert(index, text)` splices into the text of its cause at the
//! declared index, splitting the enclosing slice when the index falls
//! inside it. Each `Delete(start, end)` tombstones characters of its
//! cause's text without removing them. Concurrent inserts at the same
//! index land in sibling (weave) order, identically on every replica.

use weft_core::errors::{TextError, WeaveError};
use weft_core::{Atom, AtomId, OpKind, VersionVector, WeftOp, WeftResult};
use weft_weave::{NodeIndex, Weave};

use crate::segment::TextSegment;

/// Compose the full edit group of a string value atom.
pub fn compose(weave: &Weave, value: &AtomId) -> WeftResult<Vec<TextSegment>> {
    compose_visible(weave, value, None)
}

/// Compose only the edits visible under a version vector. `None` means
/// everything currently in the weave.
pub fn compose_visible(
    weave: &Weave,
    value: &AtomId,
    version: Option<&VersionVector>,
) -> WeftResult<Vec<TextSegment>> {
    let index = weave
        .get_index(value)
        .ok_or_else(|| WeaveError::AtomNotFound { id: value.clone() })?;
    let node = weave
        .get_node(index)
        .ok_or_else(|| WeaveError::AtomNotFound { id: value.clone() })?;

    match &node.atom.op {
        WeftOp::Value {
            value: serde_json::Value::String(_),
        } => {}
        WeftOp::Value { .. } => {
            return Err(TextError::NotAString {
                id: node.atom.id.clone(),
            }
            .into())
        }
        other => {
            return Err(TextError::InvalidNodeKind {
                expected: OpKind::Value,
                found: other.kind(),
            }
            .into())
        }
    }

    let mut segments = Vec::new();
    compose_node(weave, index, version, &mut segments);
    Ok(segments)
}

/// The characters an atom itself contributes.
fn own_chars(atom: &Atom) -> Vec<char> {
    match &atom.op {
        WeftOp::Value {
            value: serde_json::Value::String(text),
        } => text.chars().collect(),
        WeftOp::Insert { text, .. } => text.chars().collect(),
        _ => Vec::new(),
    }
}

/// Recursively compose one node of the edit group.
///
/// Walks the node's own text, flushing a segment whenever an insert
/// splits it, and recursing into each insert subtree at its splice
/// point. Deletes only set tombstone marks.
fn compose_node(
    weave: &Weave,
    index: NodeIndex,
    version: Option<&VersionVector>,
    out: &mut Vec<TextSegment>,
) {
    let Some(node) = weave.get_node(index) else {
        return;
    };
    let id = node.atom.id.clone();
    let chars = own_chars(&node.atom);
    let len = chars.len();
    let mut deleted = vec![false; len];
    // (splice index, insert node), in sibling order.
    let mut inserts: Vec<(usize, NodeIndex)> = Vec::new();

    for child in weave.children(index) {
        let Some(child_node) = weave.get_node(child) else {
            continue;
        };
        let atom = &child_node.atom;
        if let Some(version) = version {
            if !version.contains(&atom.id) {
                continue;
            }
        }
        match &atom.op {
            WeftOp::Delete { start, end } => {
                let from = start.unwrap_or(0).min(len);
                let to = end.unwrap_or(len).min(len).max(from);
                for mark in &mut deleted[from..to] {
                    *mark = true;
                }
            }
            WeftOp::Insert { index: at, .. } => inserts.push(((*at).min(len), child)),
            _ => {}
        }
    }

    let mut emitted = 0;
    for position in 0..=len {
        if !inserts.iter().any(|&(at, _)| at == position) {
            continue;
        }
        if position > emitted {
            out.push(slice_segment(&id, &chars, &deleted, emitted, position));
        }
        emitted = position;
        for &(at, insert) in &inserts {
            if at == position {
                compose_node(weave, insert, version, out);
            }
        }
    }
    if len > emitted {
        out.push(slice_segment(&id, &chars, &deleted, emitted, len));
    }
}

fn slice_segment(
    id: &AtomId,
    chars: &[char],
    deleted: &[bool],
    from: usize,
    to: usize,
) -> TextSegment {
    TextSegment {
        id: id.clone(),
        offset: from,
        chars: chars[from..to]
            .iter()
            .zip(&deleted[from..to])
            .map(|(&c, &dead)| {
                if dead {
                    weft_core::constants::DELETED_CHAR
                } else {
                    c
                }
            })
            .collect(),
    }
}
