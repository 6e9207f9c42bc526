/// Semantic-layer errors raised while applying high-level events.
#[derive(Debug, thiserror::Error)]
pub enum ReducerError {
    /// A text edit referenced a bot that is not in the projection.
    #[error("unknown bot: {id}")]
    UnknownBot { id: String },

    /// A text edit referenced a tag with no editable string value.
    #[error("bot {bot} has no editable value for tag {tag}")]
    MissingTagValue { bot: String, tag: String },
}
