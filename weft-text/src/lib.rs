//! # weft-text
//!
//! Resolves the `Insert`/`Delete` atoms causally attached to a string
//! value into an ordered list of text segments, and maps logical
//! character indices — interpreted under a historical version vector —
//! to the physical positions new edits must attach under.

pub mod composer;
pub mod position;
pub mod segment;

pub use composer::{compose, compose_visible};
pub use position::{find_edit_position, find_edit_positions, EditPosition, SegmentRange};
pub use segment::{visible_text, TextSegment};
