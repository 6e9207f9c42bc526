//! # weft-core
//!
//! Foundation crate for the weft causal tree.
//! Defines atom identity and ordering, operation payloads, the per-site
//! logical clock, version vectors, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod atom;
pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export the most commonly used types at the crate root.
pub use atom::{Atom, AtomId, OpKind, Priority, SiteId, Timestamp, WeftOp};
pub use clock::{SiteStatus, VersionVector};
pub use config::TreeConfig;
pub use errors::{WeftError, WeftResult};
