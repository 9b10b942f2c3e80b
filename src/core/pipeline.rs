//! Per-version generation pipeline.
//!
//! Each configured version moves through
//! `Pending -> Fetching -> Generating -> Relocating -> Pruning -> PostProcessing -> Complete`,
//! or straight to `Skipped` when its output directory already exists. A
//! version that fails ends in `Failed` and, unless `fail_fast` is set, the
//! remaining versions still run.
//!
//! Output is assembled in a staging directory next to the final one and
//! renamed into place only after every step succeeded, so an existing output
//! directory always holds a complete build.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactCache, ArtifactRecord};
use crate::config::DatagenConfig;
use crate::error::{Error, Hint, Result};
use crate::generator::Exporter;
use crate::http::Transport;
use crate::postprocess;
use crate::prune::{self, PruneReport};
use crate::utils::io;
use crate::version::SupportedVersion;

const DATA_DIR: &str = "data";
const REPORTS_DIR: &str = "reports";
const NAMESPACE_DIR: &str = "minecraft";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionState {
    Pending,
    Skipped,
    Fetching,
    Generating,
    Relocating,
    Pruning,
    PostProcessing,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionError {
    pub code: String,
    pub message: String,
    pub details: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl From<&Error> for VersionError {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
            hints: err.hints.clone(),
        }
    }
}

/// What a successful build kept and changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildDetails {
    pub files_relocated: u64,
    pub kept_registries: Vec<String>,
    pub pruned_entries: usize,
    pub rewritten_files: Vec<String>,
    pub removed_reports: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionOutcome {
    pub version: SupportedVersion,
    pub output_dir: PathBuf,
    pub state: VersionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<VersionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VersionError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildDetails>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub total: usize,
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<VersionOutcome>,
}

impl RunSummary {
    fn from_outcomes(started_at: DateTime<Utc>, outcomes: Vec<VersionOutcome>) -> Self {
        let count = |state: VersionState| outcomes.iter().filter(|o| o.state == state).count();
        let built = count(VersionState::Complete);
        let skipped = count(VersionState::Skipped);
        let failed = count(VersionState::Failed);

        let status = if failed == 0 {
            RunStatus::Success
        } else if built + skipped > 0 {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Failed
        };

        Self {
            started_at,
            finished_at: Utc::now(),
            status,
            total: outcomes.len(),
            built,
            skipped,
            failed,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

pub struct Pipeline<'a> {
    config: &'a DatagenConfig,
    transport: &'a dyn Transport,
    exporter: &'a dyn Exporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a DatagenConfig, transport: &'a dyn Transport, exporter: &'a dyn Exporter) -> Self {
        Self {
            config,
            transport,
            exporter,
        }
    }

    /// Build every configured version whose output directory is missing.
    ///
    /// Returns `Err` only when `fail_fast` is set and a version fails, or when
    /// the output directory itself cannot be created.
    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        io::ensure_dir(&self.config.output_dir, "create output directory")?;

        let pending: Vec<SupportedVersion> = self
            .config
            .versions
            .iter()
            .filter(|v| !self.config.output_dir_for(v).exists())
            .cloned()
            .collect();

        let resolved = if pending.is_empty() {
            Ok(Vec::new())
        } else {
            ArtifactCache::new(&self.config.cache_dir, &self.config.manifest_url, self.transport)
                .resolve(&pending)
        };
        let records = match resolved {
            Ok(records) => records,
            Err(err) if self.config.fail_fast => return Err(err),
            Err(err) => {
                log_status!("pipeline", "Artifact resolution failed: {}", err);
                let outcomes = self
                    .config
                    .versions
                    .iter()
                    .map(|v| {
                        if pending.contains(v) {
                            self.failed(v, VersionState::Fetching, &err)
                        } else {
                            self.skipped(v)
                        }
                    })
                    .collect();
                return Ok(RunSummary::from_outcomes(started_at, outcomes));
            }
        };

        let mut outcomes = Vec::with_capacity(self.config.versions.len());
        for version in &self.config.versions {
            let Some(record) = records.iter().find(|r| &r.version == version) else {
                outcomes.push(self.skipped(version));
                continue;
            };

            let mut state = VersionState::Fetching;
            match self.build_version(record, &mut state) {
                Ok(build) => {
                    log_status!("pipeline", "Built {} into {}", version, self.config.output_dir_for(version).display());
                    outcomes.push(VersionOutcome {
                        version: version.clone(),
                        output_dir: self.config.output_dir_for(version),
                        state: VersionState::Complete,
                        failed_at: None,
                        error: None,
                        build: Some(build),
                    });
                }
                Err(err) => {
                    let staging = self.config.staging_dir_for(version);
                    if let Err(cleanup) = io::remove_dir_if_exists(&staging, "discard staging") {
                        log_status!("pipeline", "Could not remove {}: {}", staging.display(), cleanup);
                    }
                    if self.config.fail_fast {
                        return Err(err);
                    }
                    log_status!("pipeline", "Version {} failed while {:?}: {}", version, state, err);
                    outcomes.push(self.failed(version, state, &err));
                }
            }
        }

        Ok(RunSummary::from_outcomes(started_at, outcomes))
    }

    fn skipped(&self, version: &SupportedVersion) -> VersionOutcome {
        log_status!("pipeline", "Skipping version {}", version);
        VersionOutcome {
            version: version.clone(),
            output_dir: self.config.output_dir_for(version),
            state: VersionState::Skipped,
            failed_at: None,
            error: None,
            build: None,
        }
    }

    fn failed(&self, version: &SupportedVersion, at: VersionState, err: &Error) -> VersionOutcome {
        VersionOutcome {
            version: version.clone(),
            output_dir: self.config.output_dir_for(version),
            state: VersionState::Failed,
            failed_at: Some(at),
            error: Some(err.into()),
            build: None,
        }
    }

    fn build_version(&self, record: &ArtifactRecord, state: &mut VersionState) -> Result<BuildDetails> {
        let version = &record.version;
        let mut build = BuildDetails::default();

        *state = VersionState::Generating;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("generated_{}", version))
            .tempdir()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create scratch directory".to_string())))?;
        self.exporter.export(&record.path, scratch.path())?;
        log_status!("generate", "Generated {}: {}", version, record.path.display());

        *state = VersionState::Relocating;
        let staging = self.config.staging_dir_for(version);
        io::remove_dir_if_exists(&staging, "discard stale staging")?;
        for subtree in [DATA_DIR, REPORTS_DIR] {
            build.files_relocated += relocate(scratch.path(), &staging, subtree)?;
        }

        *state = VersionState::Pruning;
        let data_root = staging.join(DATA_DIR).join(NAMESPACE_DIR);
        let report: PruneReport = prune::prune(&data_root, &self.config.retain)?;
        build.pruned_entries = report.removed_count();
        build.kept_registries = report.kept_dirs;

        *state = VersionState::PostProcessing;
        let rewrite = &self.config.post_process.value_rewrite;
        build.rewritten_files =
            postprocess::rewrite_values(&data_root.join(&rewrite.subtree), &rewrite.from, &rewrite.to)?.rewritten;
        build.removed_reports = postprocess::reduce_to_single_file(
            &staging.join(REPORTS_DIR),
            &self.config.post_process.reports_keep,
        )?;

        let output = self.config.output_dir_for(version);
        fs::rename(&staging, &output).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("publish {}", output.display())))
        })?;

        *state = VersionState::Complete;
        Ok(build)
    }
}

/// Copy one subtree of the scratch tree into the staging directory.
fn relocate(scratch: &Path, staging: &Path, subtree: &str) -> Result<u64> {
    let src = scratch.join(subtree);
    if !src.is_dir() {
        return Err(Error::generator_output_missing(subtree, scratch.display().to_string()));
    }

    let dest = staging.join(subtree);
    io::ensure_dir(&dest, "create staging directory")?;
    io::copy_dir(&src, &dest)
}
