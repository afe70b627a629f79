//! Configuration management for verdocs.
//!
//! Parses `verdocs.yml` (or `verdocs.yaml` / `verdocs.toml`) configuration
//! files with serde and provides auto-discovery of config files in parent
//! directories. The format follows the file extension: `.toml` is TOML,
//! everything else YAML.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```yaml
//! source: .
//! target: build
//! all_versions: [v1, v2, v3]
//! generate_redirects: true
//! generate_latest: true
//! ```

mod watch_mode;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use verdocs_version::{DocVersion, VersionError};

pub use watch_mode::WatchMode;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source root.
    pub source: Option<PathBuf>,
    /// Override target root.
    pub target: Option<PathBuf>,
    /// Override requested versions.
    pub versions: Option<Vec<String>>,
    /// Override redirect generation.
    pub generate_redirects: Option<bool>,
    /// Override `latest/` alias generation.
    pub generate_latest: Option<bool>,
    /// Override watch mode.
    pub watch_mode: Option<WatchMode>,
}

/// Configuration filenames to search for, in order of preference.
const CONFIG_FILENAMES: [&str; 3] = ["verdocs.yml", "verdocs.yaml", "verdocs.toml"];

/// Versions used when the config file does not list any.
const DEFAULT_VERSION: DocVersion = DocVersion::first();

/// Raw configuration as parsed from the file (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigRaw {
    source: Option<String>,
    target: Option<String>,
    all_versions: Option<Vec<DocVersion>>,
    generate_redirects: Option<bool>,
    generate_latest: Option<bool>,
    extra_dirs: Option<Vec<String>>,
    watch_mode: Option<WatchMode>,
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct Config {
    /// Source root containing `mkdocs.yml` and `docs/`.
    pub source: PathBuf,
    /// Target root receiving the generated tree.
    pub target: PathBuf,
    /// Requested output versions, ascending and duplicate-free.
    pub versions: BTreeSet<DocVersion>,
    /// Emit redirect stubs at version-free locations.
    pub generate_redirects: bool,
    /// Emit a `latest/` alias of the newest version.
    pub generate_latest: bool,
    /// Directories below the source root copied verbatim.
    pub extra_dirs: Vec<String>,
    /// Build/watch selection.
    pub watch_mode: WatchMode,
    /// Path to the config file (set after loading).
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Malformed version string.
    #[error("{0}")]
    Version(#[from] VersionError),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for a config file in the current directory and
    /// its parents, falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// The newest requested version.
    #[must_use]
    pub fn latest(&self) -> Option<DocVersion> {
        self.versions.last().copied()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(source) = &settings.source {
            self.source.clone_from(source);
        }
        if let Some(target) = &settings.target {
            self.target.clone_from(target);
        }
        if let Some(versions) = &settings.versions {
            self.versions = versions
                .iter()
                .map(|v| DocVersion::parse(v.trim()))
                .collect::<Result<_, _>>()?;
        }
        if let Some(generate_redirects) = settings.generate_redirects {
            self.generate_redirects = generate_redirects;
        }
        if let Some(generate_latest) = settings.generate_latest {
            self.generate_latest = generate_latest;
        }
        if let Some(watch_mode) = settings.watch_mode {
            self.watch_mode = watch_mode;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versions.is_empty() {
            return Err(ConfigError::Validation(
                "all_versions must list at least one version".to_owned(),
            ));
        }
        if self.source == self.target {
            return Err(ConfigError::Validation(format!(
                "source and target must differ (both are {})",
                self.source.display()
            )));
        }
        if let Some(dir) = self.extra_dirs.iter().find(|d| escapes_root(d)) {
            return Err(ConfigError::Validation(format!(
                "extra_dirs entry '{dir}' must be a relative path inside the source root"
            )));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            for name in CONFIG_FILENAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: base.to_path_buf(),
            target: base.join("build"),
            versions: BTreeSet::from([DEFAULT_VERSION]),
            generate_redirects: false,
            generate_latest: false,
            extra_dirs: default_extra_dirs(),
            watch_mode: WatchMode::None,
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let raw = parse_raw(path, &content)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::resolve(raw, config_dir);
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Resolve raw values against the config directory.
    fn resolve(raw: ConfigRaw, config_dir: &Path) -> Self {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        let versions = if let Some(versions) = raw.all_versions {
            versions.into_iter().collect()
        } else {
            tracing::warn!(
                default = %DEFAULT_VERSION,
                "No all_versions list found in configuration, using default"
            );
            BTreeSet::from([DEFAULT_VERSION])
        };

        Self {
            source: resolve(raw.source.as_deref(), "."),
            target: resolve(raw.target.as_deref(), "build"),
            versions,
            generate_redirects: raw.generate_redirects.unwrap_or(false),
            generate_latest: raw.generate_latest.unwrap_or(false),
            extra_dirs: raw.extra_dirs.unwrap_or_else(default_extra_dirs),
            watch_mode: raw.watch_mode.unwrap_or_default(),
            config_path: None,
        }
    }
}

fn default_extra_dirs() -> Vec<String> {
    vec!["theme_overrides".to_owned()]
}

/// Parse raw config text according to the file extension.
fn parse_raw(path: &Path, content: &str) -> Result<ConfigRaw, ConfigError> {
    if path.extension().is_some_and(|e| e == "toml") {
        Ok(toml::from_str(content)?)
    } else if content.trim().is_empty() {
        Ok(ConfigRaw::default())
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

fn escapes_root(dir: &str) -> bool {
    let path = Path::new(dir);
    path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn versions(list: &[&str]) -> BTreeSet<DocVersion> {
        list.iter().map(|v| DocVersion::parse(v).unwrap()).collect()
    }

    fn parse_yaml(yaml: &str) -> Config {
        let raw: ConfigRaw = serde_yaml::from_str(yaml).unwrap();
        Config::resolve(raw, Path::new("/project"))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.source, PathBuf::from("/test"));
        assert_eq!(config.target, PathBuf::from("/test/build"));
        assert_eq!(config.versions, versions(&["v1"]));
        assert!(!config.generate_redirects);
        assert!(!config.generate_latest);
        assert_eq!(config.extra_dirs, vec!["theme_overrides".to_owned()]);
        assert_eq!(config.watch_mode, WatchMode::None);
    }

    #[test]
    fn test_parse_full_yaml_config() {
        let config = parse_yaml(
            r"
source: docs-src
target: out
all_versions: [v3, v1, 2, v1]
generate_redirects: true
generate_latest: true
extra_dirs: [theme_overrides, overrides/partials]
watch_mode: buildAndWatch
",
        );
        assert_eq!(config.source, PathBuf::from("/project/docs-src"));
        assert_eq!(config.target, PathBuf::from("/project/out"));
        assert_eq!(config.versions, versions(&["v1", "v2", "v3"]));
        assert!(config.generate_redirects);
        assert!(config.generate_latest);
        assert_eq!(
            config.extra_dirs,
            vec!["theme_overrides".to_owned(), "overrides/partials".to_owned()]
        );
        assert_eq!(config.watch_mode, WatchMode::BuildAndWatch);
        assert_eq!(config.latest(), Some(DocVersion::new(3)));
    }

    #[test]
    fn test_missing_versions_defaults_to_v1() {
        let config = parse_yaml("source: .\n");
        assert_eq!(config.versions, versions(&["v1"]));
    }

    #[test]
    fn test_invalid_version_in_yaml_is_error() {
        let result: Result<ConfigRaw, _> = serde_yaml::from_str("all_versions: [v1, next]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml_config() {
        let raw = parse_raw(
            Path::new("/project/verdocs.toml"),
            r#"
source = "site"
all_versions = ["v1", "v1.1"]
generate_redirects = true
"#,
        )
        .unwrap();
        let config = Config::resolve(raw, Path::new("/project"));
        assert_eq!(config.source, PathBuf::from("/project/site"));
        assert_eq!(config.versions, versions(&["v1", "v1.1"]));
        assert!(config.generate_redirects);
    }

    #[test]
    fn test_parse_empty_yaml_file() {
        let raw = parse_raw(Path::new("verdocs.yml"), "").unwrap();
        let config = Config::resolve(raw, Path::new("/project"));
        assert_eq!(config.source, PathBuf::from("/project/."));
        assert_eq!(config.versions, versions(&["v1"]));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("verdocs.yml");
        std::fs::write(
            &config_path,
            "source: src\ntarget: out\nall_versions: [v1, v2]\n",
        )
        .unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(config.source, temp_dir.path().join("src"));
        assert_eq!(config.target, temp_dir.path().join("out"));
        assert_eq!(config.config_path, Some(config_path));
    }

    #[test]
    fn test_load_rejects_unquoted_decimal_versions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("verdocs.yml");
        std::fs::write(&config_path, "all_versions: [1.9, 1.10]\n").unwrap();

        let err = Config::load(Some(&config_path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Yaml(_)), "{err}");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/verdocs.yml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_apply_cli_settings_versions() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            versions: Some(vec!["v2".to_owned(), " 1.5 ".to_owned()]),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides).unwrap();

        assert_eq!(config.versions, versions(&["v1.5", "v2"]));
    }

    #[test]
    fn test_apply_cli_settings_invalid_version() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            versions: Some(vec!["vNext".to_owned()]),
            ..Default::default()
        };

        let err = config.apply_cli_settings(&overrides).unwrap_err();

        assert!(matches!(err, ConfigError::Version(_)));
    }

    #[test]
    fn test_apply_cli_settings_flags_and_paths() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source: Some(PathBuf::from("/src")),
            target: Some(PathBuf::from("/out")),
            generate_redirects: Some(true),
            generate_latest: Some(true),
            watch_mode: Some(WatchMode::WatchOnly),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides).unwrap();

        assert_eq!(config.source, PathBuf::from("/src"));
        assert_eq!(config.target, PathBuf::from("/out"));
        assert!(config.generate_redirects);
        assert!(config.generate_latest);
        assert_eq!(config.watch_mode, WatchMode::WatchOnly);
        assert_eq!(config.versions, versions(&["v1"])); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default()).unwrap();

        assert_eq!(config.source, PathBuf::from("/test"));
        assert_eq!(config.target, PathBuf::from("/test/build"));
    }

    // Validation tests

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_versions() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.versions.clear();
        assert_validation_error(&config, &["all_versions"]);
    }

    #[test]
    fn test_validate_source_equals_target() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.target = PathBuf::from("/test");
        assert_validation_error(&config, &["source and target"]);
    }

    #[test]
    fn test_validate_extra_dir_escaping_root() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.extra_dirs = vec!["../elsewhere".to_owned()];
        assert_validation_error(&config, &["extra_dirs", "../elsewhere"]);
    }
}
