//! Filesystem scanning and the state-assurance procedure.
//!
//! Every command starts by reconciling the registry against what is
//! actually on disk, so interrupted installs or hand-copied version
//! directories never leave the two views disagreeing.

use crate::config::CacheConfig;
use crate::registry::{Instance, Registry};
use renutil_core::{Error, Result, Version};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Enumerate immediate subdirectories of the cache root whose names parse
/// as versions. Anything else (the registry file, stray data) is skipped
/// silently.
pub fn scan(cache_root: &Path) -> Result<Vec<Instance>> {
    let entries = fs::read_dir(cache_root)
        .map_err(|e| Error::io("failed to scan cache root", cache_root, e))?;

    let mut instances = Vec::new();
    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        match name.parse::<Version>() {
            Ok(version) => {
                debug!("Found version directory {}", name);
                instances.push(Instance {
                    version,
                    path: name.to_string(),
                });
            }
            Err(_) => debug!("Skipping non-version entry {}", name),
        }
    }
    Ok(instances)
}

/// Ensure the cache root exists and is usable, then reconcile the registry
/// against the directories actually present.
///
/// Reconciliation is merge-only: directories that appear are adopted into
/// the registry, but an entry is never pruned just because its directory
/// vanished. Pruning happens only through explicit uninstall or forced
/// reinstall. Running this twice with no filesystem changes in between
/// performs no writes on the second run.
pub fn assure_state(config: &CacheConfig) -> Result<Registry> {
    let root = config.root();

    if !root.is_dir() {
        debug!("Creating cache root {}", root.display());
        fs::create_dir_all(root)
            .map_err(|e| Error::io("failed to create cache root", root, e))?;
    }

    check_access(root)?;

    let scanned = scan(root)?;
    let registry_path = config.registry_path();

    if !registry_path.exists() {
        let registry = Registry::with_instances(&registry_path, scanned);
        registry.persist()?;
        return Ok(registry);
    }

    let mut registry = match Registry::load(&registry_path) {
        Ok(registry) => registry,
        Err(Error::RegistryUnreadable { path, source }) => {
            // Recover locally: drop the corrupt file and rebuild from disk.
            warn!(
                "Registry at {} is unreadable ({}), rebuilding from scan",
                path.display(),
                source
            );
            fs::remove_file(&path)
                .map_err(|e| Error::io("failed to remove corrupt registry", &path, e))?;
            let registry = Registry::with_instances(&path, scanned);
            registry.persist()?;
            return Ok(registry);
        }
        Err(e) => return Err(e),
    };

    registry.merge_scanned(scanned)?;
    Ok(registry)
}

/// Verify read and write access to the cache root.
fn check_access(root: &Path) -> Result<()> {
    // Read access: enumerating the directory must work.
    if fs::read_dir(root).is_err() {
        return Err(Error::CacheUnwritable {
            path: root.to_path_buf(),
        });
    }
    // Write access: probe with a throwaway file.
    let probe = root.join(".renutil-probe");
    match fs::write(&probe, b"") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            Ok(())
        }
        Err(_) => Err(Error::CacheUnwritable {
            path: root.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_scan_ignores_non_version_entries() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("7.3.5")).unwrap();
        fs::create_dir(temp.path().join("6.99.12")).unwrap();
        fs::create_dir(temp.path().join("not-a-version")).unwrap();
        fs::write(temp.path().join("index.json"), "[]").unwrap();
        fs::write(temp.path().join("1.2.3"), "a file, not a dir").unwrap();

        let mut found: Vec<String> = scan(temp.path())
            .unwrap()
            .iter()
            .map(|i| i.version.to_string())
            .collect();
        found.sort();
        assert_eq!(found, ["6.99.12", "7.3.5"]);
    }

    #[test]
    fn test_assure_state_creates_root_and_registry() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path().join("cache"));

        let registry = assure_state(&config).unwrap();
        assert!(config.root().is_dir());
        assert!(config.registry_path().exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_assure_state_seeds_registry_from_scan() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fs::create_dir(temp.path().join("7.3.5")).unwrap();

        let registry = assure_state(&config).unwrap();
        assert!(registry.is_installed(&v("7.3.5")));
    }

    #[test]
    fn test_assure_state_merges_new_directories() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());

        assure_state(&config).unwrap();
        fs::create_dir(temp.path().join("7.4.11")).unwrap();

        let registry = assure_state(&config).unwrap();
        assert!(registry.is_installed(&v("7.4.11")));
    }

    #[test]
    fn test_assure_state_never_prunes_entries() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fs::create_dir(temp.path().join("7.3.5")).unwrap();
        assure_state(&config).unwrap();

        // Directory vanishes out-of-band; the entry must survive.
        fs::remove_dir(temp.path().join("7.3.5")).unwrap();
        let registry = assure_state(&config).unwrap();
        assert!(registry.is_installed(&v("7.3.5")));
    }

    #[test]
    fn test_assure_state_is_idempotent() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fs::create_dir(temp.path().join("7.3.5")).unwrap();
        fs::create_dir(temp.path().join("6.99.12")).unwrap();

        assure_state(&config).unwrap();
        let first = fs::read(config.registry_path()).unwrap();
        let first_mtime = fs::metadata(config.registry_path())
            .unwrap()
            .modified()
            .unwrap();

        assure_state(&config).unwrap();
        let second = fs::read(config.registry_path()).unwrap();
        let second_mtime = fs::metadata(config.registry_path())
            .unwrap()
            .modified()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first_mtime, second_mtime);
    }

    #[test]
    fn test_assure_state_rebuilds_corrupt_registry() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fs::create_dir(temp.path().join("7.3.5")).unwrap();
        fs::write(config.registry_path(), "{{{ definitely not json").unwrap();

        let registry = assure_state(&config).unwrap();
        assert!(registry.is_installed(&v("7.3.5")));

        // The rebuilt file must be loadable again.
        let reloaded = Registry::load(config.registry_path()).unwrap();
        assert_eq!(reloaded.len(), 1);
    }
}
