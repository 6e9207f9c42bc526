use crate::atom::AtomId;

/// Structural weave errors.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// The inserted atom references a cause not present in the weave.
    /// Recovered by the caller: buffer the atom and fetch the missing
    /// ancestor from the transport layer.
    #[error("dangling cause: atom {atom} references missing cause {cause}")]
    DanglingCause { atom: AtomId, cause: AtomId },

    #[error("atom not found: {id}")]
    AtomNotFound { id: AtomId },

    #[error("no atom with content hash {hash}")]
    HashNotFound { hash: String },
}
