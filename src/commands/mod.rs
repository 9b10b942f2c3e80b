use std::path::PathBuf;

use registry_datagen::DatagenConfig;

pub type CmdResult<T> = registry_datagen::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the run configuration, narrowed to `only` when given.
    pub(crate) fn load_config(&self, only: &[String]) -> registry_datagen::Result<DatagenConfig> {
        DatagenConfig::load(self.config.as_deref())?.restricted_to(only)
    }
}

pub mod fetch;
pub mod generate;
pub mod prune;
pub mod versions;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (registry_datagen::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Generate(args) => dispatch!(args, global, generate),
        crate::Commands::Fetch(args) => dispatch!(args, global, fetch),
        crate::Commands::Prune(args) => dispatch!(args, global, prune),
        crate::Commands::Versions(args) => dispatch!(args, global, versions),
    }
}
