//! Cache-root configuration.
//!
//! The cache root is a single directory holding the registry file, one
//! sub-directory per installed version, and transient downloaded archives.
//! It used to be process-wide mutable state in earlier renutil versions;
//! here it is an explicit value threaded through every operation.

use directories::BaseDirs;
use renutil_core::{Result, Version};
use std::path::{Path, PathBuf};

/// Name of the registry file inside the cache root.
pub const REGISTRY_FILENAME: &str = "index.json";

/// Name of the cache directory under the user's home.
const DEFAULT_DIR_NAME: &str = ".renutil";

/// Location of the cache root and paths derived from it.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    root: PathBuf,
}

impl CacheConfig {
    /// Create a configuration with an explicit cache root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a configuration rooted at the default `~/.renutil`.
    pub fn default_root() -> Result<Self> {
        let dirs = BaseDirs::new().ok_or_else(|| {
            anyhow::anyhow!("could not determine home directory for the cache root")
        })?;
        Ok(Self {
            root: dirs.home_dir().join(DEFAULT_DIR_NAME),
        })
    }

    /// Resolve from an optional override, falling back to the default root.
    pub fn resolve(override_root: Option<PathBuf>) -> Result<Self> {
        match override_root {
            Some(root) => Ok(Self::new(root)),
            None => Self::default_root(),
        }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the persisted registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILENAME)
    }

    /// Install directory for a version (named by its canonical string).
    pub fn version_dir(&self, version: &Version) -> PathBuf {
        self.root.join(version.to_string())
    }

    /// Path for a transient downloaded archive.
    pub fn archive_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = CacheConfig::new("/tmp/renutil-cache");
        assert_eq!(
            config.registry_path(),
            PathBuf::from("/tmp/renutil-cache/index.json")
        );
        let version: Version = "7.3.5".parse().unwrap();
        assert_eq!(
            config.version_dir(&version),
            PathBuf::from("/tmp/renutil-cache/7.3.5")
        );
    }

    #[test]
    fn test_resolve_prefers_override() {
        let config = CacheConfig::resolve(Some(PathBuf::from("/tmp/other"))).unwrap();
        assert_eq!(config.root(), Path::new("/tmp/other"));
    }
}
