//! # weft-weave
//!
//! The weave: an ordered causal tree of atoms with a deterministic,
//! replica-independent total order, tombstone-based removal, and
//! synchronous garbage collection of superseded subtrees. The
//! [`CausalTree`] couples a weave with a site clock and a version
//! vector into the unit of replication.

pub mod node;
pub mod result;
pub mod tree;
pub mod weave;

pub use node::{NodeIndex, WeaveNode};
pub use result::{WeaveEvent, WeaveResult};
pub use tree::CausalTree;
pub use weave::Weave;
