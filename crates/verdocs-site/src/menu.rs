//! Per-directory navigation manifests.
//!
//! A directory may hold a default manifest (`.pages`) and versioned ones
//! (`v2.pages`). Each requested version uses the manifest with the same
//! version, else the newest one below it, else the default. The chosen
//! manifest is pruned of entries pointing at pages that were not rendered
//! for that version before it is written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use verdocs_meta::{Mapping, Value, parse_mapping, to_yaml_string};
use verdocs_storage::Storage;
use verdocs_version::{DocVersion, VersionError};

use crate::config::MANIFEST_NAME;
use crate::render::RenderContext;

/// Manifest key holding the navigation list.
pub const NAV_KEY: &str = "nav";

/// Rest marker expanding to the remaining pages of a directory.
const REST_MARKER: &str = "...";

/// Pick the manifest answering `requested`.
///
/// Exact match first, then the greatest version strictly below `requested`,
/// then `default`.
#[must_use]
pub fn resolve_manifest<'a, M>(
    requested: DocVersion,
    variants: &'a BTreeMap<DocVersion, M>,
    default: Option<&'a M>,
) -> Option<&'a M> {
    variants
        .get(&requested)
        .or_else(|| variants.range(..requested).next_back().map(|(_, m)| m))
        .or(default)
}

/// Drop `nav` entries referencing pages missing from `output_dir`.
///
/// String entries and string values of labeled entries are page references,
/// resolved against `output_dir`. Nested lists are pruned recursively and
/// labeled groups left empty are dropped, as is `nav` itself when nothing
/// survives. Rest markers, URLs and non-string values pass through, as do
/// all keys other than `nav`.
#[must_use]
pub fn prune_manifest(manifest: &Mapping, output_dir: &Path, storage: &dyn Storage) -> Mapping {
    let pruner = Pruner {
        output_dir,
        storage,
    };
    let mut result = Mapping::new();
    for (key, value) in manifest {
        if key.as_str() == Some(NAV_KEY)
            && let Value::Sequence(entries) = value
        {
            let entries = pruner.prune_list(entries);
            if !entries.is_empty() {
                result.insert(key.clone(), Value::Sequence(entries));
            }
        } else {
            result.insert(key.clone(), value.clone());
        }
    }
    result
}

struct Pruner<'a> {
    output_dir: &'a Path,
    storage: &'a dyn Storage,
}

impl Pruner<'_> {
    fn prune_list(&self, entries: &[Value]) -> Vec<Value> {
        entries.iter().filter_map(|e| self.prune_entry(e)).collect()
    }

    fn prune_entry(&self, entry: &Value) -> Option<Value> {
        match entry {
            Value::String(reference) => self
                .page_exists(reference)
                .then(|| entry.clone()),
            Value::Sequence(entries) => {
                let entries = self.prune_list(entries);
                (!entries.is_empty()).then_some(Value::Sequence(entries))
            }
            Value::Mapping(group) => {
                let group: Mapping = group
                    .iter()
                    .filter_map(|(label, value)| {
                        self.prune_entry(value).map(|value| (label.clone(), value))
                    })
                    .collect();
                (!group.is_empty()).then_some(Value::Mapping(group))
            }
            other => Some(other.clone()),
        }
    }

    fn page_exists(&self, reference: &str) -> bool {
        if is_passthrough(reference) {
            return true;
        }
        let path = self.output_dir.join(reference);
        let exists = self.storage.exists(&path);
        if !exists {
            tracing::warn!(
                reference,
                dir = %self.output_dir.display(),
                "Dropping manifest entry for page not rendered in this version"
            );
        }
        exists
    }
}

fn is_passthrough(reference: &str) -> bool {
    reference.starts_with(REST_MARKER) || reference.contains("://")
}

/// Manifests of one source directory.
#[derive(Clone, Debug, Default)]
pub struct MenuGroup {
    dir: PathBuf,
    default: Option<PathBuf>,
    variants: BTreeMap<DocVersion, PathBuf>,
}

impl MenuGroup {
    /// Create an empty group for `dir`, relative to the versioned source root.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Directory relative to the versioned source root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Register a manifest file: `.pages` as the default, `<version>.pages`
    /// under its version.
    pub fn add_manifest(&mut self, path: &Path) -> Result<(), VersionError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name == MANIFEST_NAME {
            self.default = Some(path.to_path_buf());
        } else {
            let version_text = name.strip_suffix(MANIFEST_NAME).unwrap_or(&name);
            let version = DocVersion::parse(version_text)?;
            self.variants.insert(version, path.to_path_buf());
        }
        Ok(())
    }

    /// Source manifest answering `version`.
    #[must_use]
    pub fn resolve(&self, version: DocVersion) -> Option<&Path> {
        resolve_manifest(version, &self.variants, self.default.as_ref()).map(PathBuf::as_path)
    }

    /// Resolve, prune and write the manifest of every requested version.
    ///
    /// Must run after all pages of the same versions are rendered. Returns
    /// the number of files written.
    pub(crate) fn render(&self, ctx: &RenderContext<'_>) -> usize {
        let mut written = 0;
        for &version in &ctx.config.versions {
            let Some(source) = self.resolve(version) else {
                tracing::warn!(
                    version = %version,
                    dir = %self.dir.display(),
                    "No manifest for version"
                );
                continue;
            };
            let output_dir = ctx.config.version_root(version).join(&self.dir);
            written += usize::from(self.render_one(ctx, source, &output_dir));
        }
        written
    }

    fn render_one(&self, ctx: &RenderContext<'_>, source: &Path, output_dir: &Path) -> bool {
        let manifest = match ctx.storage.read(source).map(|text| parse_mapping(&text)) {
            Ok(Ok(manifest)) => manifest,
            Ok(Err(e)) => {
                tracing::warn!(source = %source.display(), error = %e, "Skipping invalid manifest");
                return false;
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to read manifest");
                return false;
            }
        };

        let pruned = prune_manifest(&manifest, output_dir, ctx.storage);
        if pruned.is_empty() {
            tracing::info!(
                source = %source.display(),
                dir = %self.dir.display(),
                "Manifest is empty after pruning, not written"
            );
            return false;
        }

        match to_yaml_string(&pruned) {
            Ok(text) => ctx.write(&output_dir.join(MANIFEST_NAME), &text),
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to serialize manifest");
                false
            }
        }
    }
}
