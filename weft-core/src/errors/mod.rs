//! Error taxonomy for the weft workspace.
//!
//! One file per error domain, wrapped by the umbrella [`WeftError`].

pub mod reducer_error;
pub mod text_error;
pub mod weave_error;

pub use reducer_error::ReducerError;
pub use text_error::TextError;
pub use weave_error::WeaveError;

/// Umbrella error for all weft operations.
#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    #[error(transparent)]
    Weave(#[from] WeaveError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Reducer(#[from] ReducerError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used across the workspace.
pub type WeftResult<T> = Result<T, WeftError>;
