//! Allow-list of registry subtrees that survive pruning.
//!
//! Entries are stored as segment lists so that matching happens on whole
//! path segments: `worldgen/biome` never matches `worldgen/biomelike`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionSet {
    entries: Vec<Vec<String>>,
}

impl RetentionSet {
    /// Build a set from `/`-separated relative paths, preserving order.
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<Vec<String>> = Vec::new();
        for raw in paths {
            let segments = parse_relative_path("retain", raw.as_ref())?;
            if entries.contains(&segments) {
                return Err(Error::config_invalid_value(
                    "retain",
                    Some(raw.as_ref().to_string()),
                    "Duplicate retention entry",
                ));
            }
            entries.push(segments);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `relative` names a retained subtree exactly.
    pub fn retains(&self, relative: &[String]) -> bool {
        self.entries.iter().any(|entry| entry.as_slice() == relative)
    }

    /// True when `relative` is a retained subtree or lies inside one.
    pub fn covers(&self, relative: &[String]) -> bool {
        self.entries.iter().any(|entry| relative.starts_with(entry))
    }

    /// True when `relative` is a strict ancestor of some retained subtree.
    pub fn is_ancestor_of_retained(&self, relative: &[String]) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.len() > relative.len() && entry.starts_with(relative))
    }

    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.join("/")).collect()
    }
}

/// Split a `/`-separated path that must stay inside the directory it is joined to.
pub fn parse_relative_path(key: &str, raw: &str) -> Result<Vec<String>> {
    let invalid = |problem: &str| {
        Error::config_invalid_value(key, Some(raw.to_string()), problem.to_string())
    };

    if raw.contains('\\') {
        return Err(invalid("Paths must use '/' as separator"));
    }
    if raw.starts_with('/') {
        return Err(invalid("Paths must be relative"));
    }

    let segments: Vec<String> = raw
        .trim_end_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();

    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid("Paths must not contain empty segments"));
    }
    if segments.iter().any(|s| s == "." || s == "..") {
        return Err(invalid("Paths must not contain '.' or '..'"));
    }

    Ok(segments)
}

impl Serialize for RetentionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.paths().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetentionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let paths = Vec::<String>::deserialize(deserializer)?;
        RetentionSet::new(paths).map_err(|e| serde::de::Error::custom(e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    #[test]
    fn matching_is_segment_exact() {
        let set = RetentionSet::new(["biome"]).unwrap();

        assert!(set.retains(&rel("biome")));
        assert!(!set.retains(&rel("biomelike")));
        assert!(!set.is_ancestor_of_retained(&rel("bio")));
    }

    #[test]
    fn nested_entry_makes_parents_ancestors() {
        let set = RetentionSet::new(["worldgen/biome"]).unwrap();

        assert!(set.is_ancestor_of_retained(&rel("worldgen")));
        assert!(!set.retains(&rel("worldgen")));
        assert!(set.retains(&rel("worldgen/biome")));
        assert!(!set.is_ancestor_of_retained(&rel("worldgen/biome")));
        assert!(!set.is_ancestor_of_retained(&rel("world")));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let set = RetentionSet::new(["chat_type/"]).unwrap();
        assert_eq!(set.paths(), vec!["chat_type".to_string()]);
    }

    #[test]
    fn rejects_malformed_entries() {
        for bad in ["", "/abs", "a//b", "../up", "a/./b", "a\\b"] {
            let err = RetentionSet::new([bad]).unwrap_err();
            assert_eq!(err.code.as_str(), "config.invalid_value", "entry {:?}", bad);
        }
    }

    #[test]
    fn covers_entries_and_their_descendants_only() {
        let set = RetentionSet::new(["wolf_variant", "worldgen/biome"]).unwrap();

        assert!(set.covers(&rel("wolf_variant")));
        assert!(set.covers(&rel("worldgen/biome/cold")));
        assert!(!set.covers(&rel("worldgen")));
        assert!(!set.covers(&rel("wolf_variants")));
    }

    #[test]
    fn rejects_duplicates() {
        assert!(RetentionSet::new(["damage_type", "damage_type/"]).is_err());
    }

    #[test]
    fn deserializes_from_string_list() {
        let set: RetentionSet = serde_json::from_str(r#"["trim_material","worldgen/biome"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(serde_json::from_str::<RetentionSet>(r#"["../x"]"#).is_err());
    }
}
