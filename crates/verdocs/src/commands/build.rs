//! `verdocs build` command implementation.

use clap::Args;
use verdocs_config::WatchMode;

use super::common::{CommonArgs, run};
use crate::error::CliError;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Watch mode by first letter: `w`atch only, `b`uild and watch, or none
    /// (overrides config).
    #[arg(long, value_name = "MODE")]
    watch_mode: Option<WatchMode>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the source tree is unusable.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        run(&self.common, self.watch_mode)
    }
}
