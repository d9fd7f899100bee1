//! Post-extraction fix-ups: textual patches and permission bits.
//!
//! The release archives ship build scripts that expect an interactive
//! terminal and a writable python installation; these patches are fixed,
//! enumerable edits keyed to the release's directory layout.

use renutil_core::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Insert `patch` around the line following the first line that contains
/// `target_line`.
///
/// With `reverse = false` the patch text is written before that following
/// line; with `reverse = true` it is written after it. A target on the
/// final line inserts nothing.
pub fn patch_file(path: &Path, target_line: &str, patch: &str, reverse: bool) -> Result<()> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::io("failed to read file for patching", path, e))?;

    let mut patched = String::with_capacity(content.len() + patch.len());
    let mut pending = false;
    for line in content.split_inclusive('\n') {
        if pending {
            if reverse {
                patched.push_str(line);
                patched.push_str(patch);
            } else {
                patched.push_str(patch);
                patched.push_str(line);
            }
            pending = false;
        } else {
            patched.push_str(line);
        }
        if line.contains(target_line) {
            pending = true;
        }
    }

    debug!("Patched {} at '{}'", path.display(), target_line);
    fs::write(path, patched).map_err(|e| Error::io("failed to write patched file", path, e))
}

/// Mark a file readable and executable by its owner.
///
/// No-op on platforms without Unix permission bits.
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o500))
            .map_err(|e| Error::io("failed to set executable bit", path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
