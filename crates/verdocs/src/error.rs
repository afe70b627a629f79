//! CLI error types.

use verdocs_config::ConfigError;
use verdocs_site::ProcessError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Process(#[from] ProcessError),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// `2` when the configuration file is missing, `3` when the source tree
    /// lacks `mkdocs.yml` or `docs/`, `1` otherwise.
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Config(ConfigError::NotFound(_)) => 2,
            Self::Process(e) if e.is_precondition() => 3,
            _ => 1,
        }
    }
}
