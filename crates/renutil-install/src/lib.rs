//! Installation lifecycle for SDK releases: download, extract, patch,
//! register, launch, clean up.

pub mod download;
pub mod extract;
pub mod launch;
pub mod patch;
pub mod platform;
pub mod workflow;

pub use launch::launch;
pub use platform::Platform;
pub use workflow::{cleanup, install, uninstall};
