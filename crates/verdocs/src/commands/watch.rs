//! `verdocs watch` command implementation.

use clap::Args;
use verdocs_config::WatchMode;

use super::common::{CommonArgs, run};
use crate::error::CliError;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Skip the initial build and only process changes.
    #[arg(long)]
    no_build: bool,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the source tree is unusable
    /// or the watcher loses events.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        run(&self.common, Some(self.watch_mode()))
    }

    fn watch_mode(&self) -> WatchMode {
        if self.no_build {
            WatchMode::WatchOnly
        } else {
            WatchMode::BuildAndWatch
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: WatchArgs,
    }

    #[test]
    fn test_watch_mode_from_flags() {
        let cli = TestCli::parse_from(["verdocs"]);
        assert_eq!(cli.args.watch_mode(), WatchMode::BuildAndWatch);

        let cli = TestCli::parse_from(["verdocs", "--no-build"]);
        assert_eq!(cli.args.watch_mode(), WatchMode::WatchOnly);
    }
}
