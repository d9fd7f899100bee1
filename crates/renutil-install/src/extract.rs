//! Archive extraction with common-prefix stripping.
//!
//! Release archives wrap their payload in a single top-level versioned
//! folder (`renpy-7.3.5-sdk/...`) that must not appear in the install
//! directory, so extraction strips the longest common directory prefix
//! shared by every file entry.

use renutil_core::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Compute the longest common directory prefix across all non-directory
/// entry names, component-wise.
///
/// Directory entries (names ending in `/`) are ignored; only the directory
/// part of each file name participates. An entry at the archive root
/// forces an empty prefix.
pub fn common_prefix<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut prefix: Option<Vec<&str>> = None;
    for name in names {
        if name.ends_with('/') {
            continue;
        }
        let mut dirs: Vec<&str> = name.split('/').collect();
        dirs.pop(); // drop the file name component
        match prefix {
            None => prefix = Some(dirs),
            Some(ref mut current) => {
                let shared = current
                    .iter()
                    .zip(dirs.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                current.truncate(shared);
            }
        }
    }
    prefix
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Strip a computed prefix (plus trailing separator) from an entry name.
///
/// Returns `None` for the prefix directories themselves and for directory
/// entries outside the prefix; the files below them created those
/// directories on demand anyway.
pub fn strip_entry_name<'a>(name: &'a str, prefix: &[String]) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(name);
    }
    let joined = format!("{}/", prefix.join("/"));
    match name.strip_prefix(&joined) {
        Some("") | None => None,
        Some(stripped) => Some(stripped),
    }
}

/// Extract a zip archive into `dest`, stripping the common leading path
/// component so files land directly under the target directory.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .map_err(|e| Error::io("failed to open archive", archive_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| anyhow::anyhow!("failed to read archive {}: {}", archive_path.display(), e))?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let prefix = common_prefix(names.iter().map(String::as_str));
    debug!(
        "Extracting {} entries to {} (prefix {:?})",
        names.len(),
        dest.display(),
        prefix
    );

    fs::create_dir_all(dest).map_err(|e| Error::io("failed to create install directory", dest, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            anyhow::anyhow!("failed to read archive entry in {}: {}", archive_path.display(), e)
        })?;

        let Some(stripped) = strip_entry_name(entry.name(), &prefix).map(str::to_string) else {
            continue;
        };
        let Some(relative) = sanitize_entry_path(&stripped) else {
            debug!("Skipping unsafe entry name {:?}", entry.name());
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| Error::io("failed to create directory", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io("failed to create directory", parent, e))?;
        }
        let mut out =
            File::create(&target).map_err(|e| Error::io("failed to create file", &target, e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| Error::io("failed to write file", &target, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&target, fs::Permissions::from_mode(mode));
        }
    }

    Ok(())
}

/// Reject entry names that would escape the destination directory.
fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    if path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn strip_all(names: &[&str]) -> Vec<String> {
        let prefix = common_prefix(names.iter().copied());
        names
            .iter()
            .filter_map(|n| strip_entry_name(n, &prefix))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_common_prefix_is_stripped() {
        assert_eq!(
            strip_all(&["proj-1.0/a.txt", "proj-1.0/sub/b.txt"]),
            ["a.txt", "sub/b.txt"]
        );
    }

    #[test]
    fn test_no_common_prefix_is_unchanged() {
        assert_eq!(
            strip_all(&["proj-1.0/a.txt", "other/b.txt"]),
            ["proj-1.0/a.txt", "other/b.txt"]
        );
    }

    #[test]
    fn test_root_level_file_forces_empty_prefix() {
        assert_eq!(
            strip_all(&["readme.txt", "proj-1.0/a.txt"]),
            ["readme.txt", "proj-1.0/a.txt"]
        );
    }

    #[test]
    fn test_directory_entries_are_ignored_for_prefix() {
        assert_eq!(
            strip_all(&["proj-1.0/", "unrelated/", "proj-1.0/a.txt"]),
            ["a.txt"]
        );
    }

    #[test]
    fn test_nested_prefix() {
        assert_eq!(
            strip_all(&["a/b/x.txt", "a/b/c/y.txt"]),
            ["x.txt", "c/y.txt"]
        );
    }

    #[test]
    fn test_extract_zip_strips_wrapper_folder() {
        let temp = tempdir().unwrap();
        let archive_path = temp.path().join("renpy-7.3.5-sdk.zip");

        let mut writer = ZipWriter::new(File::create(&archive_path).unwrap());
        let options = SimpleFileOptions::default();
        writer.add_directory("renpy-7.3.5-sdk/", options).unwrap();
        writer.start_file("renpy-7.3.5-sdk/renpy.py", options).unwrap();
        writer.write_all(b"# entry point\n").unwrap();
        writer
            .start_file("renpy-7.3.5-sdk/launcher/script.rpy", options)
            .unwrap();
        writer.write_all(b"label start:\n").unwrap();
        writer.finish().unwrap();

        let dest = temp.path().join("7.3.5");
        extract_zip(&archive_path, &dest).unwrap();

        assert!(dest.join("renpy.py").is_file());
        assert!(dest.join("launcher/script.rpy").is_file());
        assert!(!dest.join("renpy-7.3.5-sdk").exists());
    }

    #[test]
    fn test_extract_zip_skips_traversal_entries() {
        let temp = tempdir().unwrap();
        let archive_path = temp.path().join("evil.zip");

        let mut writer = ZipWriter::new(File::create(&archive_path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("ok.txt", options).unwrap();
        writer.write_all(b"fine\n").unwrap();
        writer.start_file("../escape.txt", options).unwrap();
        writer.write_all(b"nope\n").unwrap();
        writer.finish().unwrap();

        let dest = temp.path().join("out");
        extract_zip(&archive_path, &dest).unwrap();

        assert!(dest.join("ok.txt").is_file());
        assert!(!temp.path().join("escape.txt").exists());
    }
}
