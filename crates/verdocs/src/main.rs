//! verdocs CLI - multi-version `MkDocs` preprocessor.
//!
//! Provides commands for:
//! - `build`: Render one output tree per requested version
//! - `watch`: Keep the output up to date while sources change

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, WatchArgs};
use output::Output;

/// verdocs - multi-version `MkDocs` preprocessor.
#[derive(Parser)]
#[command(name = "verdocs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the versioned documentation tree.
    Build(BuildArgs),
    /// Watch the source tree and rebuild changed files.
    Watch(WatchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.common.verbose,
        Commands::Watch(args) => args.common.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Watch(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::from(err.exit_code())
        }
    }
}
