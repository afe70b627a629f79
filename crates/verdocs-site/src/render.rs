//! Output writing shared by the render stages.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use verdocs_meta::{Document, Mapping, Value, parse_mapping, write_front_matter};
use verdocs_storage::Storage;
use verdocs_version::DocVersion;

use crate::config::SiteConfig;
use crate::variation::PageVariation;

/// Front matter key receiving the version a page was rendered for.
pub const THIS_VERSION_KEY: &str = "this_version";

/// Front matter key receiving every requested version, ascending.
pub const ALL_VERSIONS_KEY: &str = "all_versions";

/// Front matter key receiving whether the page belongs to the newest version.
pub const IS_LATEST_KEY: &str = "is_latest";

/// Configuration and storage a render stage writes through.
///
/// Every write failure is logged and reported as `false`, so a single bad
/// file never stops the remaining output.
#[derive(Clone, Copy)]
pub(crate) struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub storage: &'a dyn Storage,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a SiteConfig, storage: &'a dyn Storage) -> Self {
        Self { config, storage }
    }

    /// Write text to `target`.
    pub fn write(&self, target: &Path, contents: &str) -> bool {
        match self.storage.write(target, contents) {
            Ok(()) => {
                tracing::debug!(target = %target.display(), "Wrote file");
                true
            }
            Err(e) => {
                tracing::warn!(target = %target.display(), error = %e, "Failed to write file");
                false
            }
        }
    }

    /// Copy `source` to `target` unchanged.
    pub fn copy(&self, source: &Path, target: &Path) -> bool {
        match self.storage.copy(source, target) {
            Ok(()) => {
                tracing::debug!(
                    source = %source.display(),
                    target = %target.display(),
                    "Copied file"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.display(),
                    target = %target.display(),
                    error = %e,
                    "Failed to copy file"
                );
                false
            }
        }
    }

    /// Create `dir` and its parents.
    pub fn create_dir_all(&self, dir: &Path) -> bool {
        match self.storage.create_dir_all(dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to create directory");
                false
            }
        }
    }

    /// List the files below `root`; an unreadable tree lists nothing.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        self.storage.walk(root).unwrap_or_else(|e| {
            tracing::warn!(root = %root.display(), error = %e, "Failed to list directory");
            Vec::new()
        })
    }

    /// Render one variation of a page for `version` into `target`.
    ///
    /// The front matter is stamped with the version information and the body
    /// is copied unchanged.
    pub fn render_page(&self, variation: &PageVariation, version: DocVersion, target: &Path) -> bool {
        let source = &variation.source;
        let content = match self.storage.read(source) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to read page");
                return false;
            }
        };

        let document = Document::split(&content);
        let mut values = match document.front_matter.map(parse_mapping).transpose() {
            Ok(values) => values.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    source = %source.display(),
                    error = %e,
                    "Skipping page with invalid front matter"
                );
                return false;
            }
        };

        let is_latest = self.config.latest() == Some(version);
        stamp_versions(&mut values, version, &self.config.versions, is_latest);

        match write_front_matter(&values, document.body) {
            Ok(rendered) => {
                tracing::info!(
                    version = %version,
                    source = %source.display(),
                    target = %target.display(),
                    "Rendered page"
                );
                self.write(target, &rendered)
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to render front matter");
                false
            }
        }
    }
}

/// Record the active version, all requested versions and the latest flag.
///
/// Keys already present keep their position in the mapping.
pub fn stamp_versions(
    values: &mut Mapping,
    version: DocVersion,
    all_versions: &BTreeSet<DocVersion>,
    is_latest: bool,
) {
    let all = all_versions
        .iter()
        .map(|v| Value::String(v.to_string()))
        .collect();
    values.insert(
        Value::from(THIS_VERSION_KEY),
        Value::String(version.to_string()),
    );
    values.insert(Value::from(ALL_VERSIONS_KEY), Value::Sequence(all));
    values.insert(Value::from(IS_LATEST_KEY), Value::Bool(is_latest));
}
