//! Retention pruning of a generated registry tree.
//!
//! Walks the tree top-down once. A directory whose relative path is in the
//! [`RetentionSet`] is kept whole, a directory on the way to a retained path is
//! descended into, and everything else (including every plain file outside a
//! retained subtree) is deleted.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::retention::RetentionSet;

/// What a prune pass kept and removed, as `/`-joined paths relative to the root.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PruneReport {
    pub kept_dirs: Vec<String>,
    pub removed_dirs: Vec<String>,
    pub removed_files: Vec<String>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.removed_dirs.len() + self.removed_files.len()
    }
}

/// Prune `root` so only the retained subtrees and their ancestor chain remain.
pub fn prune(root: &Path, retain: &RetentionSet) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    prune_dir(root, &[], retain, &mut report)?;

    log_status!(
        "prune",
        "{}: kept {} subtree(s), removed {} dir(s) and {} file(s)",
        root.display(),
        report.kept_dirs.len(),
        report.removed_dirs.len(),
        report.removed_files.len()
    );

    Ok(report)
}

fn prune_dir(
    dir: &Path,
    relative: &[String],
    retain: &RetentionSet,
    report: &mut PruneReport,
) -> Result<()> {
    let read = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read directory {}", dir.display())))
    })?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read directory {}", dir.display())))
        })?;
        entries.push(entry);
    }

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("stat {}", path.display())))
        })?;

        let mut entry_relative = relative.to_vec();
        entry_relative.push(entry.file_name().to_string_lossy().into_owned());
        let display = entry_relative.join("/");

        if !file_type.is_dir() {
            fs::remove_file(&path).map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("remove file {}", path.display())))
            })?;
            report.removed_files.push(display);
        } else if retain.retains(&entry_relative) {
            report.kept_dirs.push(display);
        } else if retain.is_ancestor_of_retained(&entry_relative) {
            prune_dir(&path, &entry_relative, retain, report)?;
        } else {
            fs::remove_dir_all(&path).map_err(|e| {
                Error::internal_io(
                    e.to_string(),
                    Some(format!("remove directory {}", path.display())),
                )
            })?;
            report.removed_dirs.push(display);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn files_under(root: &Path) -> Vec<String> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path: PathBuf = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    let rel = path.strip_prefix(root).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        let mut out = Vec::new();
        walk(root, root, &mut out);
        out.sort();
        out
    }

    #[test]
    fn keeps_only_nested_retained_subtree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "worldgen/biome/plains.json", "{\"plains\":true}");
        write(root, "worldgen/configured_feature/tree.json", "{}");
        write(root, "banner_pattern/base.json", "{}");

        let set = RetentionSet::new(["worldgen/biome"]).unwrap();
        let report = prune(root, &set).unwrap();

        assert_eq!(files_under(root), vec!["worldgen/biome/plains.json"]);
        assert!(root.join("worldgen").is_dir());
        assert!(!root.join("worldgen/configured_feature").exists());
        assert!(!root.join("banner_pattern").exists());
        assert_eq!(
            fs::read_to_string(root.join("worldgen/biome/plains.json")).unwrap(),
            "{\"plains\":true}"
        );
        assert_eq!(report.kept_dirs, vec!["worldgen/biome".to_string()]);
    }

    #[test]
    fn string_prefix_sibling_is_removed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "biome/a.json", "a");
        write(root, "biomelike/b.json", "b");

        let set = RetentionSet::new(["biome"]).unwrap();
        prune(root, &set).unwrap();

        assert_eq!(files_under(root), vec!["biome/a.json"]);
        assert!(!root.join("biomelike").exists());
    }

    #[test]
    fn loose_files_outside_retained_subtrees_are_removed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "pack.mcmeta", "{}");
        write(root, "worldgen/noise.json", "{}");
        write(root, "worldgen/biome/desert.json", "{}");
        write(root, "worldgen/biome/nested/deep.json", "{}");

        let set = RetentionSet::new(["worldgen/biome"]).unwrap();
        let report = prune(root, &set).unwrap();

        assert_eq!(
            files_under(root),
            vec!["worldgen/biome/desert.json", "worldgen/biome/nested/deep.json"]
        );
        let mut removed = report.removed_files.clone();
        removed.sort();
        assert_eq!(removed, vec!["pack.mcmeta", "worldgen/noise.json"]);
    }

    #[test]
    fn retained_entry_absent_from_tree_leaves_empty_ancestor() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "worldgen/structure/village.json", "{}");

        let set = RetentionSet::new(["worldgen/biome"]).unwrap();
        prune(root, &set).unwrap();

        assert!(root.join("worldgen").is_dir());
        assert!(files_under(root).is_empty());
    }

    #[test]
    fn pruning_twice_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "chat_type/chat.json", "{}");
        write(root, "recipe/stick.json", "{}");

        let set = RetentionSet::new(["chat_type"]).unwrap();
        prune(root, &set).unwrap();
        let second = prune(root, &set).unwrap();

        assert_eq!(second.removed_count(), 0);
        assert_eq!(files_under(root), vec!["chat_type/chat.json"]);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let set = RetentionSet::new(["chat_type"]).unwrap();

        let err = prune(&tmp.path().join("missing"), &set).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
