//! Configuration for a causal tree replica.
//!
//! # Examples
//!
//! ```
//! use weft_core::TreeConfig;
//!
//! let config = TreeConfig::default();
//! assert!(config.garbage_collect);
//! ```

use serde::{Deserialize, Serialize};

/// Per-replica tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Whether superseded value subtrees and tombstoned descendants are
    /// pruned synchronously as part of applying the update that made
    /// them unreachable. Default: true. Disabling keeps the full atom
    /// history in the weave.
    pub garbage_collect: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            garbage_collect: true,
        }
    }
}
