//! List command implementation.

use renutil_catalog::ReleaseCatalog;
use renutil_core::Result;
use renutil_registry::{assure_state, CacheConfig};
use renutil_ui::Output;

/// Run the list command.
///
/// The cache is reconciled first either way. Installed versions come from
/// the registry; `--all` asks the release catalog instead. Both listings
/// show at most `num_versions` entries, newest first.
pub async fn run(
    config: &CacheConfig,
    all: bool,
    num_versions: usize,
    output: &Output,
) -> Result<()> {
    let registry = assure_state(config)?;

    if all {
        let catalog = ReleaseCatalog::new();
        let releases = catalog.list_available().await?;
        for release in releases.iter().take(num_versions) {
            output.result(&release.version.to_string());
        }
        return Ok(());
    }

    let instances = registry.list_sorted(true);
    if instances.is_empty() {
        output.info("No versions installed.");
        return Ok(());
    }
    for instance in instances.iter().take(num_versions) {
        output.result(&instance.version.to_string());
    }
    Ok(())
}
