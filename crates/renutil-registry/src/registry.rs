//! Persisted registry of installed instances.

use renutil_core::{Error, Result, Version};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A fully installed, registered copy of the SDK for one version.
///
/// `path` is the version's directory name relative to the cache root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Version of the installed SDK.
    pub version: Version,
    /// Install directory name relative to the cache root.
    pub path: String,
}

impl Instance {
    /// Create an instance whose directory is named by the version string.
    pub fn new(version: Version) -> Self {
        let path = version.to_string();
        Self { version, path }
    }

    /// Absolute install directory under the given cache root.
    pub fn install_dir(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(&self.path)
    }

    /// The bundled Android toolchain directory.
    pub fn rapt_dir(&self, cache_root: &Path) -> PathBuf {
        self.install_dir(cache_root).join("rapt")
    }

    /// The launcher project directory.
    pub fn launcher_dir(&self, cache_root: &Path) -> PathBuf {
        self.install_dir(cache_root).join("launcher")
    }
}

// Equality and ordering delegate to the version.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for Instance {}

impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

/// The persisted index of installed instances, unique by version.
///
/// Mutation is not safe across concurrent processes; the only guarantee is
/// that the file itself is replaced atomically on every persist.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    instances: Vec<Instance>,
}

impl Registry {
    /// Create an empty registry backed by the given file path.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            instances: Vec::new(),
        }
    }

    /// Create a registry from a set of instances, deduplicated by version
    /// and sorted newest first.
    pub fn with_instances(path: impl Into<PathBuf>, instances: Vec<Instance>) -> Self {
        let mut registry = Self::empty(path);
        for instance in instances {
            if !registry.is_installed(&instance.version) {
                registry.instances.push(instance);
            }
        }
        registry.sort();
        registry
    }

    /// Load the registry from disk.
    ///
    /// A missing file yields an empty registry. An existing file that cannot
    /// be deserialized yields `RegistryUnreadable`; the caller's recovery
    /// policy is to delete it and rebuild from a filesystem scan.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!("No registry at {}, starting empty", path.display());
            return Ok(Self::empty(path));
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::io("failed to read registry", &path, e))?;

        let instances: Vec<Instance> =
            serde_json::from_str(&content).map_err(|e| Error::RegistryUnreadable {
                path: path.clone(),
                source: Box::new(e),
            })?;

        let mut registry = Self { path, instances };
        registry.sort();
        Ok(registry)
    }

    /// Write the current instance set to disk.
    ///
    /// Writes to a sibling temp file and renames it into place so a
    /// concurrent reader never observes a partial file.
    pub fn persist(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.instances)
            .map_err(|e| anyhow::anyhow!("failed to serialize registry: {}", e))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .map_err(|e| Error::io("failed to write registry", &tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| Error::io("failed to replace registry", &self.path, e))?;

        debug!(
            "Persisted {} instance(s) to {}",
            self.instances.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Add an instance and persist. No-op if the version is already present.
    pub fn add_instance(&mut self, instance: Instance) -> Result<bool> {
        if self.is_installed(&instance.version) {
            return Ok(false);
        }
        self.instances.push(instance);
        self.sort();
        self.persist()?;
        Ok(true)
    }

    /// Remove the instance for a version and persist. No-op if absent.
    pub fn remove_instance(&mut self, version: &Version) -> Result<Option<Instance>> {
        match self.instances.iter().position(|i| &i.version == version) {
            Some(pos) => {
                let removed = self.instances.remove(pos);
                self.persist()?;
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    /// Merge scanned instances not yet present by version, persisting once
    /// if anything was added. Never removes entries.
    pub fn merge_scanned(&mut self, scanned: Vec<Instance>) -> Result<bool> {
        let mut added = false;
        for instance in scanned {
            if !self.is_installed(&instance.version) {
                debug!("Adopting scanned instance {}", instance.version);
                self.instances.push(instance);
                added = true;
            }
        }
        if added {
            self.sort();
            self.persist()?;
        }
        Ok(added)
    }

    /// Get the instance for a version, if installed.
    pub fn get_instance(&self, version: &Version) -> Option<&Instance> {
        self.instances.iter().find(|i| &i.version == version)
    }

    /// Check if a version is installed.
    pub fn is_installed(&self, version: &Version) -> bool {
        self.instances.iter().any(|i| &i.version == version)
    }

    /// All instances ordered by version.
    pub fn list_sorted(&self, descending: bool) -> Vec<Instance> {
        let mut instances = self.instances.clone();
        if descending {
            instances.sort_by(|a, b| b.cmp(a));
        } else {
            instances.sort();
        }
        instances
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the registry holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Stored newest first so the persisted form is deterministic.
    fn sort(&mut self) {
        self.instances.sort_by(|a, b| b.cmp(a));
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
    fn test_load_missing_is_empty() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path().join("index.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let temp = tempdir().unwrap();
        let mut registry = Registry::empty(temp.path().join("index.json"));

        assert!(registry.add_instance(Instance::new(v("7.3.5"))).unwrap());
        assert!(!registry.add_instance(Instance::new(v("7.3.5"))).unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.json");
        let mut registry = Registry::empty(&path);
        registry.add_instance(Instance::new(v("7.3.5"))).unwrap();
        let before = std::fs::read(&path).unwrap();

        assert!(registry.remove_instance(&v("6.99.12")).unwrap().is_none());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_persist_load_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.json");
        let mut registry = Registry::empty(&path);
        registry.add_instance(Instance::new(v("7.3.5"))).unwrap();
        registry.add_instance(Instance::new(v("6.99.12"))).unwrap();

        let loaded = Registry::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.is_installed(&v("7.3.5")));
        assert!(loaded.is_installed(&v("6.99.12")));
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.json");
        let mut registry = Registry::empty(&path);
        registry.add_instance(Instance::new(v("7.3.5"))).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_registry_unreadable() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = Registry::load(&path).unwrap_err();
        assert!(matches!(
            err,
            renutil_core::Error::RegistryUnreadable { .. }
        ));
    }

    #[test]
    fn test_list_sorted_descending() {
        let temp = tempdir().unwrap();
        let mut registry = Registry::empty(temp.path().join("index.json"));
        for s in ["6.99.12", "7.3.5", "7.1.3", "8.0.0-rc.1"] {
            registry.add_instance(Instance::new(v(s))).unwrap();
        }

        let versions: Vec<String> = registry
            .list_sorted(true)
            .iter()
            .map(|i| i.version.to_string())
            .collect();
        assert_eq!(versions, ["8.0.0-rc.1", "7.3.5", "7.1.3", "6.99.12"]);

        let ascending: Vec<String> = registry
            .list_sorted(false)
            .iter()
            .map(|i| i.version.to_string())
            .collect();
        assert_eq!(ascending, ["6.99.12", "7.1.3", "7.3.5", "8.0.0-rc.1"]);
    }

    #[test]
    fn test_wire_format_is_version_and_path() {
        let instance = Instance::new(v("7.3.5"));
        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(json["version"], "7.3.5");
        assert_eq!(json["path"], "7.3.5");
    }

    #[test]
    fn test_instance_derived_paths() {
        let instance = Instance::new(v("7.3.5"));
        let root = Path::new("/cache");
        assert_eq!(instance.install_dir(root), PathBuf::from("/cache/7.3.5"));
        assert_eq!(instance.rapt_dir(root), PathBuf::from("/cache/7.3.5/rapt"));
        assert_eq!(
            instance.launcher_dir(root),
            PathBuf::from("/cache/7.3.5/launcher")
        );
    }
}
