//! Logical time: the per-site clock and the version vector.

pub mod site_status;
pub mod version_vector;

pub use site_status::SiteStatus;
pub use version_vector::VersionVector;
