//! Maps logical character indices to physical edit positions.
//!
//! A logical index only means something relative to the state its
//! author actually saw, so resolution happens under a version vector:
//! segments from atoms the author had not seen are skipped entirely.

use serde::{Deserialize, Serialize};

use weft_core::constants::DELETED_CHAR;
use weft_core::errors::TextError;
use weft_core::{AtomId, VersionVector, WeftResult};
use weft_weave::Weave;

use crate::composer::compose_visible;
use crate::segment::TextSegment;

/// The physical attachment point for a new edit: the atom to cause it
/// under and the offset into that atom's original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPosition {
    pub id: AtomId,
    pub offset: usize,
}

/// One slice of a ranged edit: where to attach and how many physical
/// characters of that atom's text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRange {
    pub position: EditPosition,
    pub count: usize,
}

/// Resolve the physical position a new edit at `index` must attach
/// under, interpreting `index` against the segments visible in
/// `version`.
pub fn find_edit_position(
    weave: &Weave,
    value: &AtomId,
    version: &VersionVector,
    index: usize,
) -> WeftResult<EditPosition> {
    let segments = compose_visible(weave, value, Some(version))?;
    if segments.is_empty() {
        if index == 0 {
            return Ok(EditPosition {
                id: value.clone(),
                offset: 0,
            });
        }
        return Err(TextError::IndexOutOfRange { index, len: 0 }.into());
    }

    let total: usize = segments.iter().map(TextSegment::live_len).sum();
    if index > total {
        return Err(TextError::IndexOutOfRange { index, len: total }.into());
    }

    // A boundary index resolves into the segment it closes, so the new
    // edit chains under the text its author just passed: a splice at
    // the seam of two segments lands after the earlier one's characters.
    let mut remaining = index;
    for segment in &segments {
        let live = segment.live_len();
        if remaining <= live {
            return Ok(EditPosition {
                id: segment.id.clone(),
                offset: offset_before(segment, remaining),
            });
        }
        remaining -= live;
    }
    // Unreachable: the bounds check above guarantees resolution.
    Err(TextError::IndexOutOfRange { index, len: total }.into())
}

/// Resolve a ranged edit covering `count` live characters starting at
/// logical `index`, splitting across as many physical segments as
/// necessary.
pub fn find_edit_positions(
    weave: &Weave,
    value: &AtomId,
    version: &VersionVector,
    index: usize,
    count: usize,
) -> WeftResult<Vec<SegmentRange>> {
    let segments = compose_visible(weave, value, Some(version))?;
    let total: usize = segments.iter().map(TextSegment::live_len).sum();
    if index + count > total {
        return Err(TextError::IndexOutOfRange {
            index: index + count,
            len: total,
        }
        .into());
    }

    let mut ranges = Vec::new();
    let mut to_skip = index;
    let mut to_cover = count;
    for segment in &segments {
        if to_cover == 0 {
            break;
        }
        let live = segment.live_len();
        if to_skip >= live {
            to_skip -= live;
            continue;
        }
        let take = (live - to_skip).min(to_cover);
        let start = offset_before(segment, to_skip);
        let end = offset_after(segment, to_skip + take);
        ranges.push(SegmentRange {
            position: EditPosition {
                id: segment.id.clone(),
                offset: start,
            },
            count: end - start,
        });
        to_cover -= take;
        to_skip = 0;
    }
    Ok(ranges)
}

/// Physical offset just before the `live_index`-th live character
/// (before any tombstones sitting at that boundary).
fn offset_before(segment: &TextSegment, live_index: usize) -> usize {
    let mut live_seen = 0;
    for (position, &c) in segment.chars.iter().enumerate() {
        if live_seen == live_index {
            return segment.offset + position;
        }
        if c != DELETED_CHAR {
            live_seen += 1;
        }
    }
    segment.offset + segment.chars.len()
}

/// Physical offset just after the `live_count`-th live character.
fn offset_after(segment: &TextSegment, live_count: usize) -> usize {
    let mut live_seen = 0;
    for (position, &c) in segment.chars.iter().enumerate() {
        if c != DELETED_CHAR {
            live_seen += 1;
            if live_seen == live_count {
                return segment.offset + position + 1;
            }
        }
    }
    segment.offset + segment.chars.len()
}
