//! Cleanup command implementation.

use super::parse_version;
use renutil_core::Result;
use renutil_registry::CacheConfig;
use renutil_ui::Output;

/// Run the cleanup command.
pub fn run(config: &CacheConfig, version: &str, output: &Output) -> Result<()> {
    let version = parse_version(version)?;

    renutil_install::cleanup(config, &version)?;
    output.status("Cleaned", &version.to_string());
    Ok(())
}
