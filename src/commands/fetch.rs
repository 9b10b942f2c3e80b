use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use registry_datagen::{ArtifactCache, ArtifactRecord, HttpTransport};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct FetchArgs {
    /// Only fetch these versions (repeatable)
    #[arg(long, value_name = "VERSION")]
    pub only: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub cache_dir: PathBuf,
    pub artifacts: Vec<ArtifactRecord>,
}

pub fn run(args: FetchArgs, global: &GlobalArgs) -> CmdResult<FetchOutput> {
    let config = global.load_config(&args.only)?;
    let transport = HttpTransport::new(config.http_timeout())?;

    let cache = ArtifactCache::new(&config.cache_dir, &config.manifest_url, &transport);
    let artifacts = cache.resolve(&config.versions)?;

    Ok((
        FetchOutput {
            cache_dir: config.cache_dir.clone(),
            artifacts,
        },
        0,
    ))
}
