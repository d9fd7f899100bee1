//! The install/uninstall/cleanup workflow.
//!
//! An install walks download -> extract -> patch -> register -> finalize.
//! Any step may fail and aborts the whole workflow; partially-written
//! files stay on disk and are recovered by a forced reinstall or an
//! explicit uninstall, never by automatic rollback.

use crate::download;
use crate::extract::extract_zip;
use crate::patch::{patch_file, set_executable};
use crate::platform::Platform;
use renutil_catalog::ReleaseCatalog;
use renutil_core::{CommandRunner, EnvVars, Error, Result, Version};
use renutil_registry::{assure_state, CacheConfig, Instance};
use renutil_ui::Spinner;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Known binary entry points that need their executable bit restored
/// after extraction.
const EXECUTABLE_ENTRY_POINTS: &[&str] = &["python", "pythonw", "renpy", "zsync", "zsyncmake"];

/// Transient sub-paths removed by `cleanup`, relative to the instance
/// directory.
const TRANSIENT_PATHS: &[&str] = &["tmp", "rapt/assets", "rapt/bin", "rapt/project/app"];

/// Install a version, including the bundled Android toolchain.
pub async fn install(
    config: &CacheConfig,
    catalog: &ReleaseCatalog,
    version: &Version,
    force: bool,
) -> Result<Instance> {
    let mut registry = assure_state(config)?;

    if registry.is_installed(version) {
        if !force {
            return Err(Error::already_installed(version));
        }
        info!("Uninstalling {} before reinstalling", version);
        if let Some(existing) = registry.remove_instance(version)? {
            let dir = existing.install_dir(config.root());
            if dir.exists() {
                fs::remove_dir_all(&dir)
                    .map_err(|e| Error::io("failed to remove existing install", &dir, e))?;
            }
        }
    }

    if !catalog.is_valid_version(version, &registry).await? {
        return Err(Error::invalid_version(version.to_string(), None));
    }

    info!("Downloading release archives for {}", version);
    let client = download::client()?;
    let sdk_archive = config.archive_path(&format!("renpy-{}-sdk.zip", version));
    let rapt_archive = config.archive_path(&format!("renpy-{}-rapt.zip", version));
    download::download(&client, &catalog.sdk_url(version), &sdk_archive).await?;
    download::download(&client, &catalog.rapt_url(version), &rapt_archive).await?;

    let install_dir = config.version_dir(version);
    let spinner = Spinner::new(format!("Extracting {}...", version));
    extract_zip(&sdk_archive, &install_dir)?;
    extract_zip(&rapt_archive, &install_dir.join("rapt"))?;
    spinner.finish_success(format!("Extracted {}", version));

    let platform = Platform::current()
        .ok_or_else(|| anyhow::anyhow!("could not detect a supported platform"))?;
    run_rapt_setup(&install_dir, &platform).await?;

    info!("Registering instance {}", version);
    let instance = Instance::new(version.clone());
    registry.add_instance(instance.clone())?;

    finalize_permissions(config.root(), &instance, &platform)?;

    info!("Done installing {}", version);
    Ok(instance)
}

/// Uninstall a version: deregister first, then delete the tree, so a
/// failed deletion cannot leave a registry entry pointing at a
/// half-deleted directory that is silently treated as valid.
pub fn uninstall(config: &CacheConfig, version: &Version) -> Result<()> {
    let mut registry = assure_state(config)?;

    let Some(instance) = registry.remove_instance(version)? else {
        return Err(Error::not_installed(version));
    };

    let dir = instance.install_dir(config.root());
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .map_err(|e| Error::io("failed to remove install directory", &dir, e))?;
    }
    info!("Uninstalled {}", version);
    Ok(())
}

/// Delete transient build output under an instance without touching its
/// registry entry. Purely disk-space reclamation.
pub fn cleanup(config: &CacheConfig, version: &Version) -> Result<()> {
    let registry = assure_state(config)?;

    let Some(instance) = registry.get_instance(version) else {
        return Err(Error::not_installed(version));
    };

    let install_dir = instance.install_dir(config.root());
    for relative in TRANSIENT_PATHS {
        let path = install_dir.join(relative);
        if path.is_dir() {
            debug!("Removing {}", path.display());
            fs::remove_dir_all(&path)
                .map_err(|e| Error::io("failed to remove transient path", &path, e))?;
        }
    }
    Ok(())
}

/// Patch and run the bundled Android toolchain installer.
///
/// The patches are fixed, idempotent edits: re-running them on an already
/// patched tree inserts duplicate lines which the scripts tolerate, and a
/// forced reinstall always starts from a fresh extraction anyway.
async fn run_rapt_setup(install_dir: &Path, platform: &Platform) -> Result<()> {
    let rapt_dir = install_dir.join("rapt");
    let lib_dir = install_dir.join("lib").join(platform.dir_name());
    let python = lib_dir.join(platform.python_binary());

    if platform.is_unix() {
        set_executable(&python)?;
    }

    // The installer needs the bundled python2.7 site-packages on its path
    // and must not choke on the ancient certificate bundle it ships.
    let site_packages = lib_dir.join("lib").join("python2.7");
    patch_file(
        &rapt_dir.join("android.py"),
        "import sys",
        &format!(
            "sys.path.insert(0, '{}')\n\nimport ssl\nssl._create_default_https_context = ssl._create_unverified_context\n",
            site_packages.display()
        ),
        true,
    )?;

    // Make the installer non-interactive.
    let interface = rapt_dir.join("buildlib").join("rapt").join("interface.py");
    patch_file(
        &interface,
        "def yesno_choice(self, prompt, default=None):",
        "        return True\n",
        false,
    )?;
    patch_file(
        &interface,
        "def input(self, prompt, empty=None):",
        "        return \"renutil\"\n",
        false,
    )?;

    let spinner = Spinner::new("Installing the Android toolchain...");
    let runner = CommandRunner::new()
        .with_working_dir(&rapt_dir)
        .with_env(EnvVars::RAPT_NO_TERMS, "no");
    let python_cmd = python.to_string_lossy().into_owned();
    let output = runner
        .run(python_cmd.as_str(), ["-O", "android.py", "installsdk"])
        .await?;

    for line in output.stdout.lines().chain(output.stderr.lines()) {
        let line = line.trim();
        if !line.is_empty() {
            debug!("installsdk: {}", line);
        }
    }

    if !output.success() {
        spinner.finish_error("Android toolchain installation failed");
        return Err(Error::CommandFailed {
            command: "android.py installsdk".into(),
            exit_code: Some(output.exit_code),
            stdout: output.stdout,
            stderr: output.stderr,
            fixes: vec![],
        });
    }

    spinner.finish_success("Android toolchain installed");
    Ok(())
}

/// Restore executable bits on known entry points and bump the Gradle heap
/// so Android builds don't die on large projects.
fn finalize_permissions(cache_root: &Path, instance: &Instance, platform: &Platform) -> Result<()> {
    if platform.is_unix() {
        let lib_dir = instance
            .install_dir(cache_root)
            .join("lib")
            .join(platform.dir_name());
        for name in EXECUTABLE_ENTRY_POINTS {
            let path = lib_dir.join(name);
            if path.exists() {
                set_executable(&path)?;
            }
        }
        let gradlew = instance.rapt_dir(cache_root).join("project").join("gradlew");
        if gradlew.exists() {
            set_executable(&gradlew)?;
        }
    }

    let gradle_properties = instance
        .rapt_dir(cache_root)
        .join("project")
        .join("gradle.properties");
    if gradle_properties.exists() {
        let content = fs::read_to_string(&gradle_properties)
            .map_err(|e| Error::io("failed to read gradle.properties", &gradle_properties, e))?;
        fs::write(&gradle_properties, rewrite_gradle_jvmargs(&content))
            .map_err(|e| Error::io("failed to write gradle.properties", &gradle_properties, e))?;
    }

    Ok(())
}

/// Replace the Gradle JVM-args line with a fixed 8g heap.
fn rewrite_gradle_jvmargs(content: &str) -> String {
    content
        .split_inclusive('\n')
        .map(|line| {
            if line.starts_with("org.gradle.jvmargs") {
                "org.gradle.jvmargs=-Xmx8g\n"
            } else {
                line
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn fake_install(config: &CacheConfig, version: &str) {
        let dir = config.version_dir(&v(version));
        fs::create_dir_all(dir.join("launcher")).unwrap();
        fs::create_dir_all(dir.join("rapt")).unwrap();
        fs::write(dir.join("renpy.py"), "").unwrap();
    }

    #[tokio::test]
    async fn test_install_already_installed_without_force() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fake_install(&config, "7.3.5");

        // The conflict is detected before the catalog is consulted, so an
        // unroutable base URL proves no network traffic happens.
        let catalog = ReleaseCatalog::with_base_url("http://127.0.0.1:1/dl");
        let err = install(&config, &catalog, &v("7.3.5"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInstalled { .. }));

        // Nothing was removed.
        assert!(config.version_dir(&v("7.3.5")).join("renpy.py").exists());
    }

    #[tokio::test]
    async fn test_force_reinstall_clears_previous_install_first() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fake_install(&config, "7.3.5");

        // With force, the old copy is deregistered and deleted before the
        // catalog is consulted; the unroutable base URL then aborts the
        // reinstall at the validation stage.
        let catalog = ReleaseCatalog::with_base_url("http://127.0.0.1:1/dl");
        let err = install(&config, &catalog, &v("7.3.5"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CatalogUnreachable { .. }));

        assert!(!config.version_dir(&v("7.3.5")).exists());
        let registry = assure_state(&config).unwrap();
        assert!(!registry.is_installed(&v("7.3.5")));
    }

    #[test]
    fn test_uninstall_removes_entry_and_tree() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fake_install(&config, "7.3.5");

        uninstall(&config, &v("7.3.5")).unwrap();

        assert!(!config.version_dir(&v("7.3.5")).exists());
        let registry = assure_state(&config).unwrap();
        assert!(!registry.is_installed(&v("7.3.5")));
    }

    #[test]
    fn test_uninstall_missing_is_not_installed() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());

        let err = uninstall(&config, &v("7.3.5")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
    }

    #[test]
    fn test_cleanup_removes_transient_paths_only() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());
        fake_install(&config, "7.3.5");
        let dir = config.version_dir(&v("7.3.5"));
        fs::create_dir_all(dir.join("tmp")).unwrap();
        fs::create_dir_all(dir.join("rapt/bin")).unwrap();
        fs::create_dir_all(dir.join("rapt/project/app")).unwrap();

        cleanup(&config, &v("7.3.5")).unwrap();

        assert!(!dir.join("tmp").exists());
        assert!(!dir.join("rapt/bin").exists());
        assert!(!dir.join("rapt/project/app").exists());
        // The instance itself survives, registered and on disk.
        assert!(dir.join("renpy.py").exists());
        let registry = assure_state(&config).unwrap();
        assert!(registry.is_installed(&v("7.3.5")));
    }

    #[test]
    fn test_cleanup_missing_is_not_installed() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());

        let err = cleanup(&config, &v("7.3.5")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
    }

    #[test]
    fn test_rewrite_gradle_jvmargs() {
        let content = "org.gradle.daemon=true\norg.gradle.jvmargs=-Xmx2g\nother=1\n";
        assert_eq!(
            rewrite_gradle_jvmargs(content),
            "org.gradle.daemon=true\norg.gradle.jvmargs=-Xmx8g\nother=1\n"
        );
    }
}
