//! Targeted fixups applied to a pruned output tree.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

/// Files rewritten by [`rewrite_values`], as file names inside the subtree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RewriteReport {
    pub rewritten: Vec<String>,
    pub untouched: Vec<String>,
}

/// Replace every `from` marker with `to` in each file directly inside `dir`.
///
/// Files without the marker are never written. A missing `dir` is a no-op,
/// since older releases do not ship every registry.
pub fn rewrite_values(dir: &Path, from: &str, to: &str) -> Result<RewriteReport> {
    let mut report = RewriteReport::default();
    if !dir.is_dir() {
        return Ok(report);
    }
    if from.is_empty() {
        return Err(Error::config_invalid_value(
            "post_process.value_rewrite.from",
            None,
            "Marker must not be empty",
        ));
    }

    for entry in io::list_dir(dir, "rewrite values")? {
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let contents = io::read_file(&path, "read registry entry")?;

        if contents.contains(from) {
            io::write_file(&path, &contents.replace(from, to), "rewrite registry entry")?;
            report.rewritten.push(name);
        } else {
            report.untouched.push(name);
        }
    }

    log_status!(
        "postprocess",
        "{}: rewrote {} file(s)",
        dir.display(),
        report.rewritten.len()
    );

    Ok(report)
}

/// Delete every entry of `dir` except the file named `keep`.
///
/// Returns the names of removed entries.
pub fn reduce_to_single_file(dir: &Path, keep: &str) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for entry in io::list_dir(dir, "reduce reports")? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == keep {
            continue;
        }
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        let result = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("remove {}", path.display())))
        })?;
        removed.push(name);
    }

    log_status!(
        "postprocess",
        "{}: kept {}, removed {} entr(ies)",
        dir.display(),
        keep,
        removed.len()
    );

    Ok(removed)
}
