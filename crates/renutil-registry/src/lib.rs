//! Instance registry and cache-root reconciliation for renutil.
//!
//! This crate owns the persisted mapping from version to installed
//! instance, the cache-root configuration, and the state-assurance
//! procedure that keeps the two consistent with the filesystem.

pub mod config;
pub mod registry;
pub mod scan;

pub use config::{CacheConfig, REGISTRY_FILENAME};
pub use registry::{Instance, Registry};
pub use scan::{assure_state, scan};
