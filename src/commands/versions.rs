use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use registry_datagen::SupportedVersion;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct VersionsArgs {}

#[derive(Debug, Serialize)]
pub struct VersionStatus {
    pub version: SupportedVersion,
    pub normalized: String,
    pub output_dir: PathBuf,
    pub built: bool,
    pub artifact: PathBuf,
    pub cached: bool,
}

pub fn run(_args: VersionsArgs, global: &GlobalArgs) -> CmdResult<Vec<VersionStatus>> {
    let config = global.load_config(&[])?;

    let statuses = config
        .versions
        .iter()
        .map(|version| {
            let output_dir = config.output_dir_for(version);
            let artifact = config.cache_dir.join(version.artifact_file_name());
            VersionStatus {
                version: version.clone(),
                normalized: version.normalized(),
                built: output_dir.is_dir(),
                cached: artifact.is_file(),
                output_dir,
                artifact,
            }
        })
        .collect();

    Ok((statuses, 0))
}
