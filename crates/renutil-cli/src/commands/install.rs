//! Install command implementation.

use super::parse_version;
use renutil_catalog::ReleaseCatalog;
use renutil_core::Result;
use renutil_registry::CacheConfig;
use renutil_ui::Output;

/// Run the install command.
pub async fn run(config: &CacheConfig, version: &str, force: bool, output: &Output) -> Result<()> {
    let version = parse_version(version)?;

    output.status("Installing", &version.to_string());
    let catalog = ReleaseCatalog::new();
    let instance = renutil_install::install(config, &catalog, &version, force).await?;

    output.status("Installed", &instance.install_dir(config.root()).display().to_string());
    Ok(())
}
