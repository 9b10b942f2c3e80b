use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retention::{parse_relative_path, RetentionSet};
use crate::utils::io;
use crate::version::SupportedVersion;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "datagen.json";

/// Immutable pipeline configuration, loaded from `datagen.json` or built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatagenConfig {
    #[serde(default = "default_versions")]
    pub versions: Vec<SupportedVersion>,

    #[serde(default = "default_retain")]
    pub retain: RetentionSet,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub post_process: PostProcessConfig,

    /// Abort the whole batch on the first failing version.
    #[serde(default)]
    pub fail_fast: bool,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for DatagenConfig {
    fn default() -> Self {
        Self {
            versions: default_versions(),
            retain: default_retain(),
            cache_dir: default_cache_dir(),
            output_dir: default_output_dir(),
            manifest_url: default_manifest_url(),
            generator: GeneratorConfig::default(),
            post_process: PostProcessConfig::default(),
            fail_fast: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// External data exporter invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_main_class")]
    pub main_class: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            main_class: default_main_class(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessConfig {
    #[serde(default = "default_value_rewrite")]
    pub value_rewrite: ValueRewriteConfig,

    /// The only file left in the reports tree.
    #[serde(default = "default_reports_keep")]
    pub reports_keep: String,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            value_rewrite: default_value_rewrite(),
            reports_keep: default_reports_keep(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRewriteConfig {
    /// Retained registry, relative to the pruning root.
    pub subtree: String,
    pub from: String,
    pub to: String,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_versions() -> Vec<SupportedVersion> {
    [
        "1.21.4", "1.21.2", "1.21", "1.20.5", "1.20.3", "1.20.2", "1.20", "1.19.4", "1.19.3",
    ]
    .into_iter()
    .map(SupportedVersion::new)
    .collect()
}

fn default_retain() -> RetentionSet {
    RetentionSet::new([
        "banner_pattern",
        "chat_type",
        "damage_type",
        "dimension_type",
        "painting_variant",
        "trim_material",
        "trim_pattern",
        "wolf_variant",
        "worldgen/biome",
    ])
    .unwrap_or_else(|_| unreachable!("built-in retention set is valid"))
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("servers")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_manifest_url() -> String {
    "https://launchermeta.mojang.com/mc/game/version_manifest.json".to_string()
}

fn default_program() -> String {
    "java".to_string()
}

fn default_main_class() -> String {
    "net.minecraft.data.Main".to_string()
}

fn default_value_rewrite() -> ValueRewriteConfig {
    ValueRewriteConfig {
        subtree: "wolf_variant".to_string(),
        from: "#minecraft:is_".to_string(),
        to: "minecraft:".to_string(),
    }
}

fn default_reports_keep() -> String {
    "packets.json".to_string()
}

fn default_http_timeout_secs() -> u64 {
    300
}

// =============================================================================
// Loading
// =============================================================================

impl DatagenConfig {
    /// Load from an explicit path, else `datagen.json` in the working directory,
    /// else built-in defaults. The result is validated and has `~` expanded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        let config = config.expanded();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = io::read_file(path, "read config")?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
    }

    fn expanded(mut self) -> Self {
        self.cache_dir = expand_path(&self.cache_dir);
        self.output_dir = expand_path(&self.output_dir);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.versions.is_empty() {
            return Err(Error::config_invalid_value(
                "versions",
                None,
                "At least one version must be configured",
            ));
        }

        let mut seen = HashSet::new();
        for version in &self.versions {
            if version.id().trim().is_empty() {
                return Err(Error::config_invalid_value(
                    "versions",
                    Some(version.id().to_string()),
                    "Version identifiers must not be empty",
                ));
            }
            if !seen.insert(version.id()) {
                return Err(Error::config_invalid_value(
                    "versions",
                    Some(version.id().to_string()),
                    "Duplicate version",
                ));
            }
        }

        if self.post_process.reports_keep.is_empty() || self.post_process.reports_keep.contains('/') {
            return Err(Error::config_invalid_value(
                "post_process.reports_keep",
                Some(self.post_process.reports_keep.clone()),
                "Must be a plain file name",
            ));
        }
        let subtree = &self.post_process.value_rewrite.subtree;
        let segments = parse_relative_path("post_process.value_rewrite.subtree", subtree)?;
        if !self.retain.covers(&segments) {
            return Err(Error::config_invalid_value(
                "post_process.value_rewrite.subtree",
                Some(subtree.clone()),
                "Must be a retained subtree",
            ));
        }
        if self.post_process.value_rewrite.from.is_empty() {
            return Err(Error::config_invalid_value(
                "post_process.value_rewrite.from",
                None,
                "Marker must not be empty",
            ));
        }
        if self.generator.program.trim().is_empty() {
            return Err(Error::config_missing_key("generator.program", None));
        }

        Ok(())
    }

    /// Narrow the version list to `only`, keeping configured order.
    pub fn restricted_to(&self, only: &[String]) -> Result<Self> {
        if only.is_empty() {
            return Ok(self.clone());
        }

        let unknown: Vec<&String> = only
            .iter()
            .filter(|id| !self.versions.iter().any(|v| v.id() == id.as_str()))
            .collect();
        if let Some(first) = unknown.first() {
            return Err(Error::validation_invalid_argument(
                "only",
                format!("Version '{}' is not configured", first),
                Some(first.to_string()),
            ));
        }

        let mut narrowed = self.clone();
        narrowed.versions.retain(|v| only.iter().any(|id| id == v.id()));
        Ok(narrowed)
    }

    pub fn with_fail_fast(&self, fail_fast: bool) -> Self {
        let mut config = self.clone();
        config.fail_fast = config.fail_fast || fail_fast;
        config
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Final location for a version's curated output.
    pub fn output_dir_for(&self, version: &SupportedVersion) -> PathBuf {
        self.output_dir.join(version.normalized())
    }

    /// Staging location that is renamed onto [`Self::output_dir_for`] on success.
    pub fn staging_dir_for(&self, version: &SupportedVersion) -> PathBuf {
        self.output_dir.join(format!(".{}.partial", version.normalized()))
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_supported_releases() {
        let config = DatagenConfig::default();

        assert_eq!(config.versions.len(), 9);
        assert_eq!(config.versions[0].id(), "1.21.4");
        assert_eq!(config.retain.len(), 9);
        assert_eq!(config.post_process.reports_keep, "packets.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("datagen.json");
        std::fs::write(&path, r#"{ "versions": ["1.20"], "fail_fast": true }"#).unwrap();

        let config = DatagenConfig::load(Some(&path)).unwrap();

        assert_eq!(config.versions, vec![SupportedVersion::new("1.20")]);
        assert!(config.fail_fast);
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.generator.program, "java");
    }

    #[test]
    fn invalid_json_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("datagen.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DatagenConfig::load(Some(&path)).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn invalid_retention_entry_is_rejected_on_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("datagen.json");
        std::fs::write(&path, r#"{ "retain": ["worldgen/../biome"] }"#).unwrap();

        assert!(DatagenConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn duplicate_versions_fail_validation() {
        let config = DatagenConfig {
            versions: vec![SupportedVersion::new("1.20"), SupportedVersion::new("1.20")],
            ..DatagenConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn restricted_to_keeps_configured_order() {
        let config = DatagenConfig::default();
        let only = vec!["1.20".to_string(), "1.21.4".to_string()];

        let narrowed = config.restricted_to(&only).unwrap();
        let ids: Vec<&str> = narrowed.versions.iter().map(|v| v.id()).collect();

        assert_eq!(ids, vec!["1.21.4", "1.20"]);
        assert_eq!(config.versions.len(), 9);
    }

    #[test]
    fn restricted_to_rejects_unconfigured_version() {
        let err = DatagenConfig::default()
            .restricted_to(&["1.8.9".to_string()])
            .unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn output_and_staging_dirs_use_normalized_name() {
        let config = DatagenConfig::default();
        let version = SupportedVersion::new("1.21.4");

        assert_eq!(config.output_dir_for(&version), PathBuf::from("generated/V1_21_4"));
        assert_eq!(
            config.staging_dir_for(&version),
            PathBuf::from("generated/.V1_21_4.partial")
        );
    }

    #[test]
    fn rewrite_subtree_must_stay_inside_retained_data() {
        for subtree in ["../../outside", "/etc", "wolf_variant/../..", "recipe"] {
            let mut config = DatagenConfig::default();
            config.post_process.value_rewrite.subtree = subtree.to_string();

            let err = config.validate().unwrap_err();
            assert_eq!(err.code.as_str(), "config.invalid_value", "{}", subtree);
            assert_eq!(err.details["key"], "post_process.value_rewrite.subtree");
        }

        let mut config = DatagenConfig::default();
        config.post_process.value_rewrite.subtree = "worldgen/biome".to_string();
        assert!(config.validate().is_ok());
    }
}
