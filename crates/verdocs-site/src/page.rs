//! Logical pages and version resolution.
//!
//! A logical page groups every variation of one page, keyed by the version
//! taken from each variation's filename. Resolution assigns each requested
//! version the variation that answers it:
//!
//! 1. A variation whose minimum version is itself requested answers exactly
//!    that version.
//! 2. Every requested version still open goes to the variation whose range
//!    covers it. Variations are scanned in ascending version order and the
//!    last covering one wins, which picks the highest minimum version not
//!    above the requested one.
//!
//! Requested versions no variation covers stay unresolved.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use verdocs_version::DocVersion;

use crate::redirect::RedirectStub;
use crate::render::RenderContext;
use crate::variation::PageVariation;

/// Assign each requested version the variation answering it.
///
/// Variations whose minimum version is not requested are reported and only
/// take part in the range fallback.
#[must_use]
pub fn resolve_variations<'a>(
    requested: &BTreeSet<DocVersion>,
    variations: &'a BTreeMap<DocVersion, PageVariation>,
) -> BTreeMap<DocVersion, &'a PageVariation> {
    let mut resolved = BTreeMap::new();

    for variation in variations.values() {
        if requested.contains(&variation.min_version) {
            resolved.insert(variation.min_version, variation);
        } else {
            tracing::warn!(
                version = %variation.min_version,
                path = %variation.source.display(),
                "Variation found but not requested for rendering"
            );
        }
    }

    for &version in requested {
        if resolved.contains_key(&version) {
            continue;
        }
        for variation in variations.values() {
            if variation.covers(version) {
                resolved.insert(version, variation);
            }
        }
    }

    resolved
}

/// Every variation of one page.
#[derive(Clone, Debug)]
pub struct LogicalPage {
    path: PathBuf,
    variations: BTreeMap<DocVersion, PageVariation>,
}

impl LogicalPage {
    /// Create an empty page at `path`, relative to the versioned source root
    /// and without version infix.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            variations: BTreeMap::new(),
        }
    }

    /// Version-free path relative to the versioned source root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Variations keyed by minimum version.
    #[must_use]
    pub fn variations(&self) -> &BTreeMap<DocVersion, PageVariation> {
        &self.variations
    }

    /// Add a variation, replacing one with the same minimum version.
    pub fn add_variation(&mut self, variation: PageVariation) {
        self.variations.insert(variation.min_version, variation);
    }

    /// Resolve against the requested versions.
    #[must_use]
    pub fn resolve(&self, requested: &BTreeSet<DocVersion>) -> BTreeMap<DocVersion, &PageVariation> {
        resolve_variations(requested, &self.variations)
    }

    /// Fallback title: the version-free filename.
    fn default_title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Render every resolved version, then the latest alias and redirect.
    ///
    /// Returns the number of files written.
    pub(crate) fn render(&self, ctx: &RenderContext<'_>) -> usize {
        let config = ctx.config;
        let resolved = self.resolve(&config.versions);
        let mut written = 0;

        for version in &config.versions {
            let Some(variation) = resolved.get(version) else {
                tracing::warn!(
                    version = %version,
                    page = %self.path.display(),
                    "No variation of page matches version, skipping"
                );
                continue;
            };
            let target = config.version_root(*version).join(&self.path);
            written += usize::from(ctx.render_page(variation, *version, &target));
        }

        let Some(latest) = config.latest() else {
            return written;
        };
        let Some(variation) = resolved.get(&latest) else {
            if config.generate_latest || config.generate_redirects {
                tracing::info!(
                    version = %latest,
                    page = %self.path.display(),
                    "Page is absent from the latest version, no alias or redirect"
                );
            }
            return written;
        };

        if config.generate_latest {
            let target = config.latest_root().join(&self.path);
            written += usize::from(ctx.render_page(variation, latest, &target));
        }

        if config.generate_redirects {
            let title = variation
                .title
                .clone()
                .unwrap_or_else(|| self.default_title());
            let stub = RedirectStub::new(&self.path, latest, title);
            let target = config.docs_target().join(&self.path);
            match stub.render() {
                Ok(contents) => written += usize::from(ctx.write(&target, &contents)),
                Err(e) => {
                    tracing::warn!(target = %target.display(), error = %e, "Failed to render redirect");
                }
            }
        }

        written
    }
}
