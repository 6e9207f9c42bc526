use crate::atom::{AtomId, OpKind};

/// Text composition errors. These are programmer errors: fatal to the
/// calling operation, never to the tree.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// An operation expecting one node kind was given another, e.g.
    /// requesting an edit position on a `Tag` node.
    #[error("invalid node kind: expected {expected}, found {found}")]
    InvalidNodeKind { expected: OpKind, found: OpKind },

    /// The value atom holds a non-string payload, so there is no text
    /// to edit.
    #[error("value atom {id} does not hold a string")]
    NotAString { id: AtomId },

    /// A logical character index falls outside the visible text.
    #[error("edit index {index} out of range: visible length is {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
