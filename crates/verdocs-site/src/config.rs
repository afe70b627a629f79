//! Source and target layout of a versioned site.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use verdocs_version::DocVersion;

/// `MkDocs` configuration file at the source root.
pub const MKDOCS_CONFIG: &str = "mkdocs.yml";

/// Documentation directory below the source and target roots.
pub const DOCS_DIR: &str = "docs";

/// Versioned subtree below the source documentation directory.
pub const CURRENT_DIR: &str = "current";

/// Alias directory holding a copy of the newest version.
pub const LATEST_DIR: &str = "latest";

/// Default navigation manifest name.
pub const MANIFEST_NAME: &str = ".pages";

/// Landing page name.
pub const INDEX_PAGE: &str = "index.md";

/// Settings the site index and preprocessor run with.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Source root containing `mkdocs.yml` and `docs/`.
    pub source: PathBuf,
    /// Target root receiving the generated tree.
    pub target: PathBuf,
    /// Requested output versions.
    pub versions: BTreeSet<DocVersion>,
    /// Emit redirect stubs at version-free locations.
    pub generate_redirects: bool,
    /// Emit a `latest/` alias of the newest version.
    pub generate_latest: bool,
    /// Directories below the source root copied verbatim to the target root.
    pub extra_dirs: Vec<String>,
}

impl SiteConfig {
    /// Create a config with redirects and the latest alias disabled.
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        versions: impl IntoIterator<Item = DocVersion>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            versions: versions.into_iter().collect(),
            generate_redirects: false,
            generate_latest: false,
            extra_dirs: Vec::new(),
        }
    }

    /// The newest requested version.
    #[must_use]
    pub fn latest(&self) -> Option<DocVersion> {
        self.versions.last().copied()
    }

    /// `<source>/mkdocs.yml`.
    #[must_use]
    pub fn mkdocs_source(&self) -> PathBuf {
        self.source.join(MKDOCS_CONFIG)
    }

    /// `<source>/docs`.
    #[must_use]
    pub fn docs_source(&self) -> PathBuf {
        self.source.join(DOCS_DIR)
    }

    /// `<source>/docs/current`, the root of all versioned pages.
    #[must_use]
    pub fn current_root(&self) -> PathBuf {
        self.docs_source().join(CURRENT_DIR)
    }

    /// `<target>/docs`.
    #[must_use]
    pub fn docs_target(&self) -> PathBuf {
        self.target.join(DOCS_DIR)
    }

    /// `<target>/docs/<version>`.
    #[must_use]
    pub fn version_root(&self, version: DocVersion) -> PathBuf {
        self.docs_target().join(version.to_string())
    }

    /// `<target>/docs/latest`.
    #[must_use]
    pub fn latest_root(&self) -> PathBuf {
        self.docs_target().join(LATEST_DIR)
    }

    /// Path of `path` below the versioned source tree, if it is inside it.
    #[must_use]
    pub fn relative_to_current<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(self.current_root()).ok()
    }
}
