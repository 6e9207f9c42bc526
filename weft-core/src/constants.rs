//! Shared constants for the weft workspace.

use crate::atom::Priority;

/// Priority stamped on ordinary atoms.
pub const DEFAULT_PRIORITY: Priority = 0;

/// Priority stamped on subtree tombstones so they always sort before
/// their ordinary siblings and become the first child of the atom they
/// remove.
pub const TOMBSTONE_PRIORITY: Priority = 1;

/// Sentinel that replaces a deleted character inside a text segment.
/// Deleted characters keep their slot so that concurrent edits which
/// reference positions by original index still resolve.
pub const DELETED_CHAR: char = '\0';
