//! Text segments: the composed view of one value's edit group.

use serde::{Deserialize, Serialize};

use weft_core::constants::DELETED_CHAR;
use weft_core::AtomId;

/// A contiguous slice of characters contributed by one atom.
///
/// Deleted characters are kept in place, replaced by the sentinel
/// [`DELETED_CHAR`], so concurrent edits that reference positions by
/// original index still resolve against stable offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    /// The atom (value or insert) these characters come from.
    pub id: AtomId,
    /// Offset of this slice within the atom's original text.
    pub offset: usize,
    /// The characters, deleted ones replaced by the sentinel.
    pub chars: Vec<char>,
}

impl TextSegment {
    /// Number of characters in the slice, tombstoned ones included.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the slice holds no characters at all.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Number of live (non-tombstoned) characters.
    pub fn live_len(&self) -> usize {
        self.chars.iter().filter(|&&c| c != DELETED_CHAR).count()
    }

    /// The live characters of this slice.
    pub fn visible(&self) -> String {
        self.chars.iter().filter(|&&c| c != DELETED_CHAR).collect()
    }
}

/// The externally visible text: all live characters across segments, in
/// weave order.
pub fn visible_text(segments: &[TextSegment]) -> String {
    segments.iter().map(TextSegment::visible).collect()
}
