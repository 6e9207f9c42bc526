//! # weft-reducer
//!
//! Interprets weave mutations as entity-level changes: a projection of
//! typed entities ("bots") with tags and values, derived from the weave
//! and always recomputable from it. Also applies high-level bot events
//! by authoring the corresponding atoms.

pub mod events;
pub mod query;
pub mod reducer;
pub mod state;
pub mod updates;

pub use events::{apply_events, BotEvent};
pub use reducer::WeftReducer;
pub use state::{Bot, BotsState, TagValue};
pub use updates::{BotUpdate, StateUpdates};
