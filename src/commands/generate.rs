use clap::Args;
use registry_datagen::pipeline::{Pipeline, RunSummary};
use registry_datagen::{HttpTransport, JavaExporter};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct GenerateArgs {
    /// Only build these versions (repeatable)
    #[arg(long, value_name = "VERSION")]
    pub only: Vec<String>,

    /// Stop at the first failing version instead of continuing
    #[arg(long)]
    pub fail_fast: bool,
}

pub fn run(args: GenerateArgs, global: &GlobalArgs) -> CmdResult<RunSummary> {
    let config = global.load_config(&args.only)?.with_fail_fast(args.fail_fast);
    let transport = HttpTransport::new(config.http_timeout())?;
    let exporter = JavaExporter::new(&config.generator);

    let summary = Pipeline::new(&config, &transport, &exporter).run()?;
    let exit_code = if summary.has_failures() { 1 } else { 0 };

    Ok((summary, exit_code))
}
