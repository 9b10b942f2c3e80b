use clap::Args;
use std::path::PathBuf;

use registry_datagen::prune::{self, PruneReport};
use registry_datagen::RetentionSet;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct PruneArgs {
    /// Directory to prune in place
    pub dir: PathBuf,

    /// Subtree to keep, relative to DIR (repeatable; defaults to the configured set)
    #[arg(long, value_name = "PATH")]
    pub retain: Vec<String>,
}

pub fn run(args: PruneArgs, global: &GlobalArgs) -> CmdResult<PruneReport> {
    let retain = if args.retain.is_empty() {
        global.load_config(&[])?.retain
    } else {
        RetentionSet::new(&args.retain)?
    };

    if !args.dir.is_dir() {
        return Err(registry_datagen::Error::validation_invalid_argument(
            "dir",
            format!("Not a directory: {}", args.dir.display()),
            Some(args.dir.display().to_string()),
        ));
    }

    let report = prune::prune(&args.dir, &retain)?;
    Ok((report, 0))
}
