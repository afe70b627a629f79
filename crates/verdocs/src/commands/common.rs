//! Options and pipeline shared by `build` and `watch`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use verdocs_config::{CliSettings, Config, WatchMode};
use verdocs_site::{Preprocessor, SiteConfig};
use verdocs_storage::FsStorage;

use crate::error::CliError;
use crate::output::Output;

/// Options accepted by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover verdocs.yml).
    #[arg(short, long, env = "VERDOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Source root containing mkdocs.yml and docs/ (overrides config).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Target root for the generated tree (overrides config).
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Versions to build, comma separated (overrides config).
    #[arg(long, value_delimiter = ',')]
    versions: Option<Vec<String>>,

    /// Generate redirect stubs at version-free locations.
    #[arg(long)]
    redirects: Option<bool>,

    /// Disable redirect stubs.
    #[arg(long, conflicts_with = "redirects")]
    no_redirects: bool,

    /// Generate a `latest/` copy of the newest version.
    #[arg(long)]
    latest: Option<bool>,

    /// Disable the `latest/` copy.
    #[arg(long, conflicts_with = "latest")]
    no_latest: bool,

    /// Enable verbose output (log every rendered file).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// CLI settings overriding the configuration file.
    fn cli_settings(&self, watch_mode: Option<WatchMode>) -> CliSettings {
        CliSettings {
            source: self.source.clone(),
            target: self.target.clone(),
            versions: self.versions.clone(),
            generate_redirects: self.no_redirects.then_some(false).or(self.redirects),
            generate_latest: self.no_latest.then_some(false).or(self.latest),
            watch_mode,
        }
    }
}

/// Convert the loaded configuration into site settings with absolute
/// paths, so watcher events can be matched against them.
fn site_config(config: &Config) -> Result<SiteConfig, CliError> {
    let mut site = SiteConfig::new(
        std::path::absolute(&config.source)?,
        std::path::absolute(&config.target)?,
        config.versions.iter().copied(),
    );
    site.generate_redirects = config.generate_redirects;
    site.generate_latest = config.generate_latest;
    site.extra_dirs.clone_from(&config.extra_dirs);
    Ok(site)
}

/// Load configuration and run the build and/or watch session it selects.
pub(crate) fn run(args: &CommonArgs, watch_mode: Option<WatchMode>) -> Result<(), CliError> {
    let output = Output::new();
    let settings = args.cli_settings(watch_mode);
    let config = Config::load(args.config.as_deref(), Some(&settings))?;
    let site = site_config(&config)?;

    if let Some(path) = &config.config_path {
        output.info(&format!("Config: {}", path.display()));
    }
    output.info(&format!("Source: {}", site.source.display()));
    output.info(&format!("Target: {}", site.target.display()));
    let versions: Vec<_> = site.versions.iter().map(ToString::to_string).collect();
    output.info(&format!("Versions: {}", versions.join(", ")));

    let mode = config.watch_mode;
    let mut processor = Preprocessor::new(site, Arc::new(FsStorage::new()));

    if mode.builds() {
        let report = processor.process_files()?;
        output.success(&format!(
            "Processed {} files into {}",
            report.files_processed,
            processor.config().target.display()
        ));
    } else {
        processor.index_sources()?;
    }

    if mode.watches() {
        let (events, handle) = processor.watch()?;
        output.highlight("Watching for changes (Ctrl+C to stop)");
        let result = processor.run_watch(&events);
        handle.stop();
        let report = result?;
        output.info(&format!("Processed {} files", report.files_processed));
    }

    Ok(())
}
