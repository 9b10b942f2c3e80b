//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs::{self, DirEntry};
use std::path::Path;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} ({})", operation, path.display()))))
}

/// Write content to file with standardized error handling.
///
/// Wraps `fs::write` with consistent `Error::internal_io` formatting.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} ({})", operation, path.display()))))
}

/// List the entries of a directory, failing on the first unreadable entry.
pub fn list_dir(dir: &Path, operation: &str) -> Result<Vec<DirEntry>> {
    let context = || Some(format!("{} ({})", operation, dir.display()));
    fs::read_dir(dir)
        .map_err(|e| Error::internal_io(e.to_string(), context()))?
        .map(|entry| entry.map_err(|e| Error::internal_io(e.to_string(), context())))
        .collect()
}

pub fn ensure_dir(dir: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} ({})", operation, dir.display()))))
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(dir: &Path, operation: &str) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::internal_io(
            e.to_string(),
            Some(format!("{} ({})", operation, dir.display())),
        )),
    }
}

/// Recursively copy the regular files of `src` into `dest`.
///
/// Directories are created as needed; empty source directories are not
/// reproduced.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in list_dir(src, "copy directory")? {
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("stat {}", path.display()))))?;

        if file_type.is_dir() {
            copied += copy_dir(&path, &target)?;
        } else if file_type.is_file() {
            ensure_dir(dest, "copy directory")?;
            fs::copy(&path, &target).map_err(|e| {
                Error::internal_io(
                    e.to_string(),
                    Some(format!("copy {} to {}", path.display(), target.display())),
                )
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}
