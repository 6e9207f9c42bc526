//! The per-replica logical clock.
//!
//! A replica's `SiteStatus` is an explicit value threaded through every
//! call that creates atoms, never a process-wide singleton. It is
//! mutated only by its own replica, either when stamping new atoms or
//! when absorbing observed atoms into the causal past.

use serde::{Deserialize, Serialize};

use crate::atom::{AtomId, Priority, SiteId, Timestamp};

/// A replica's stable identity plus its local logical clock.
///
/// Invariant: after observing any set of atom ids, `time` is at least
/// the highest own timestamp seen and strictly greater than every
/// foreign timestamp seen, so locally stamped atoms can never collide
/// with known history.
///
/// # Examples
///
/// ```
/// use weft_core::{SiteId, SiteStatus};
///
/// let mut site = SiteStatus::new(SiteId::new("a"));
/// let first = site.next_id(0);
/// let second = site.next_id(0);
/// assert_eq!(first.timestamp, 1);
/// assert_eq!(second.timestamp, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatus {
    /// The replica's identity.
    pub id: SiteId,
    /// The replica's current logical time.
    pub time: Timestamp,
}

impl SiteStatus {
    /// A fresh clock starting at time 0.
    pub fn new(id: SiteId) -> Self {
        Self { id, time: 0 }
    }

    /// Stamp a new atom id `(id, time + 1, priority)` and advance the
    /// clock.
    pub fn next_id(&mut self, priority: Priority) -> AtomId {
        self.time += 1;
        AtomId::with_priority(self.id.clone(), self.time, priority)
    }

    /// Absorb an observed atom id into the causal past.
    ///
    /// Foreign atoms advance the clock to `max(time, timestamp) + 1`;
    /// atoms from this site's own history only ever raise the clock to
    /// their timestamp (a late-arriving own atom never rewinds it).
    pub fn observe(&mut self, observed: &AtomId) {
        if observed.site == self.id {
            self.time = self.time.max(observed.timestamp);
        } else {
            self.time = self.time.max(observed.timestamp) + 1;
        }
    }
}
