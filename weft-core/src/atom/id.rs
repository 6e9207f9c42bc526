//! Atom identity and the replica-independent weave order.
//!
//! The ordering defined here is what makes concurrent inserts converge
//! identically on every replica: it depends only on the id itself, never
//! on wall-clock time or arrival order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site's logical timestamp. Monotonically non-decreasing per site.
pub type Timestamp = u64;

/// Tie-break integer carried by an atom id. Defaults to 0; tombstones
/// use a higher priority so they sort before ordinary siblings.
pub type Priority = u64;

/// Opaque replica identifier. Compared lexicographically.
///
/// # Examples
///
/// ```
/// use weft_core::SiteId;
///
/// let a = SiteId::new("a");
/// let b = SiteId::new("b");
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (uuid v4).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Globally unique atom identity: `(site, timestamp, priority)`.
///
/// The total **weave order** used everywhere siblings are placed:
/// higher `priority` sorts first; tie → higher `timestamp` sorts first;
/// tie → lexicographically smaller `site` sorts first. `Ord` implements
/// exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomId {
    /// The replica that authored the atom.
    pub site: SiteId,
    /// The authoring site's logical time when the atom was created.
    pub timestamp: Timestamp,
    /// Tie-break integer, 0 for ordinary atoms.
    #[serde(default)]
    pub priority: Priority,
}

impl AtomId {
    /// An id with the default priority of 0.
    pub fn new(site: SiteId, timestamp: Timestamp) -> Self {
        Self {
            site,
            timestamp,
            priority: 0,
        }
    }

    /// An id with an explicit priority.
    pub fn with_priority(site: SiteId, timestamp: Timestamp, priority: Priority) -> Self {
        Self {
            site,
            timestamp,
            priority,
        }
    }

    /// The weave order. `Ordering::Less` means `self` comes earlier in
    /// the weave than `other` when both share a cause.
    pub fn weave_cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| self.site.cmp(&other.site))
    }
}

impl PartialOrd for AtomId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AtomId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weave_cmp(other)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.priority == 0 {
            write!(f, "{}@{}", self.site, self.timestamp)
        } else {
            write!(f, "{}@{}:{}", self.site, self.timestamp, self.priority)
        }
    }
}
