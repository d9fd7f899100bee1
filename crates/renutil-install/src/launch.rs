//! Launching an installed instance.
//!
//! The engine runs through the `renpy` binary bundled under the platform
//! lib directory, with inherited stdio; the parent waits for it and
//! converts Ctrl-C into a clean kill followed by a cache-state
//! reconciliation pass.

use crate::platform::Platform;
use renutil_core::{EnvVars, Error, Result, Version};
use renutil_registry::{assure_state, CacheConfig};
use std::process::Stdio;
use tracing::{debug, info};

/// Exit code reported when the child was interrupted by Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Launch an installed version, returning the child's exit code.
///
/// By default the launcher project is opened; with `direct` the engine
/// entry point runs with exactly the passthrough arguments, which is how
/// headless distribution builds are driven.
pub async fn launch(
    config: &CacheConfig,
    version: &Version,
    direct: bool,
    args: &[String],
) -> Result<i32> {
    let registry = assure_state(config)?;

    let Some(instance) = registry.get_instance(version) else {
        return Err(Error::not_installed(version));
    };

    let platform = Platform::current()
        .ok_or_else(|| anyhow::anyhow!("could not detect a supported platform"))?;
    let install_dir = instance.install_dir(config.root());
    let lib_dir = install_dir.join("lib").join(platform.dir_name());
    let renpy = lib_dir.join(platform.renpy_binary());

    let mut cmd = tokio::process::Command::new(&renpy);
    cmd.arg("-EO").arg(install_dir.join("renpy.py"));
    if !direct {
        cmd.arg(instance.launcher_dir(config.root()));
    }
    cmd.args(args);

    // Game audio is pointless under a launcher; the bundled runtime also
    // needs its own shared libraries ahead of the system ones, but only
    // when the variable is already in use.
    cmd.env(EnvVars::SDL_AUDIODRIVER, "dummy");
    if let Ok(existing) = std::env::var(EnvVars::LD_LIBRARY_PATH) {
        if !existing.is_empty() {
            cmd.env(
                EnvVars::LD_LIBRARY_PATH,
                format!("{}:{}", lib_dir.display(), existing),
            );
        }
    }

    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!("Launching {} (direct: {})", version, direct);
    debug!("Engine binary: {}", renpy.display());

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::io("failed to launch instance", &renpy, e))?;

    tokio::select! {
        status = child.wait() => {
            let status = status
                .map_err(|e| Error::io("failed to wait for instance", &renpy, e))?;
            Ok(status.code().unwrap_or(INTERRUPTED_EXIT_CODE))
        }
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted, stopping {}", version);
            let _ = child.kill().await;
            // The engine may have written into the cache before dying.
            assure_state(config)?;
            Ok(INTERRUPTED_EXIT_CODE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_launch_missing_is_not_installed() {
        let temp = tempdir().unwrap();
        let config = CacheConfig::new(temp.path());

        let err = launch(&config, &"7.3.5".parse().unwrap(), false, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
    }
}
