use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{fetch, generate, prune, versions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "datagen")]
#[command(version = VERSION)]
#[command(about = "Generate curated registry data snapshots for each supported release")]
struct Cli {
    /// Path to a datagen.json configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build output for every configured version that is not built yet
    Generate(generate::GenerateArgs),
    /// Download missing release artifacts into the cache
    Fetch(fetch::FetchArgs),
    /// Prune a directory down to a set of retained subtrees
    Prune(prune::PruneArgs),
    /// Show configured versions and their build/cache state
    Versions(versions::VersionsArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs { config: cli.config };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
