//! Registry of logical pages and manifest groups.
//!
//! Files below the versioned source root are classified and filed under
//! their logical identity as they are discovered. Rendering then runs in
//! fixed stages: every page first, then every manifest (pruning needs the
//! rendered pages), then the landing files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use verdocs_storage::Storage;
use verdocs_version::{VersionError, strip_version_infix};

use crate::config::{MANIFEST_NAME, SiteConfig};
use crate::landing::render_landing;
use crate::menu::MenuGroup;
use crate::page::LogicalPage;
use crate::render::RenderContext;
use crate::variation::PageVariation;

/// Page file extension.
const PAGE_EXTENSION: &str = "md";

/// What a file below the versioned source root is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Markdown page, resolved per version.
    Page,
    /// Navigation manifest, resolved per version.
    Manifest,
    /// Any other file, copied into every version unchanged.
    Asset,
}

/// Error filing a source path into the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Path is not below the versioned source root.
    #[error("{} is outside the versioned source tree", .0.display())]
    OutsideCurrentTree(PathBuf),
    /// Filename carries a malformed version.
    #[error("Invalid version in {}: {source}", path.display())]
    Version {
        /// Offending file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: VersionError,
    },
}

/// What adding a path changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Indexed {
    /// A variation of the logical page at this path.
    Page(PathBuf),
    /// A manifest of the group for this directory.
    Manifest(PathBuf),
    /// An asset at this path, not tracked by the index.
    Asset(PathBuf),
}

/// Render stages, in the order they must run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    /// All logical pages, with aliases and redirects.
    Pages,
    /// All manifest groups, pruned against the rendered pages.
    Menus,
    /// Landing page and landing manifest.
    Landing,
}

impl RenderStage {
    /// Every stage in execution order.
    pub const ALL: [Self; 3] = [Self::Pages, Self::Menus, Self::Landing];
}

/// Logical pages and manifest groups of one site.
#[derive(Debug)]
pub struct SiteIndex {
    config: SiteConfig,
    pages: BTreeMap<PathBuf, LogicalPage>,
    menus: BTreeMap<PathBuf, MenuGroup>,
}

impl SiteIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            pages: BTreeMap::new(),
            menus: BTreeMap::new(),
        }
    }

    /// Settings the index renders with.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Classify a file by name.
    #[must_use]
    pub fn classify(path: &Path) -> PathKind {
        let is_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(MANIFEST_NAME));
        if is_manifest {
            PathKind::Manifest
        } else if path.extension().is_some_and(|ext| ext == PAGE_EXTENSION) {
            PathKind::Page
        } else {
            PathKind::Asset
        }
    }

    /// Logical page registered at `path` (relative, version-free).
    #[must_use]
    pub fn page(&self, path: &Path) -> Option<&LogicalPage> {
        self.pages.get(path)
    }

    /// All logical pages in path order.
    pub fn pages(&self) -> impl Iterator<Item = &LogicalPage> {
        self.pages.values()
    }

    /// Manifest group registered for `dir` (relative).
    #[must_use]
    pub fn menu(&self, dir: &Path) -> Option<&MenuGroup> {
        self.menus.get(dir)
    }

    /// All manifest groups in directory order.
    pub fn menus(&self) -> impl Iterator<Item = &MenuGroup> {
        self.menus.values()
    }

    /// Classify `path` and file it under its logical identity.
    pub fn add(&mut self, storage: &dyn Storage, path: &Path) -> Result<Indexed, IndexError> {
        match Self::classify(path) {
            PathKind::Page => self.add_page(storage, path).map(Indexed::Page),
            PathKind::Manifest => self.add_manifest(path).map(Indexed::Manifest),
            PathKind::Asset => self.relative(path).map(|rel| Indexed::Asset(rel.to_path_buf())),
        }
    }

    /// Register a page variation. Returns the logical page path.
    pub fn add_page(&mut self, storage: &dyn Storage, path: &Path) -> Result<PathBuf, IndexError> {
        let logical = strip_version_infix(self.relative(path)?);
        let variation = PageVariation::load(storage, path).map_err(|source| IndexError::Version {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            page = %logical.display(),
            version = %variation.min_version,
            "Indexed page variation"
        );
        self.pages
            .entry(logical.clone())
            .or_insert_with(|| LogicalPage::new(logical.clone()))
            .add_variation(variation);
        Ok(logical)
    }

    /// Register a manifest. Returns the directory of its group.
    pub fn add_manifest(&mut self, path: &Path) -> Result<PathBuf, IndexError> {
        let dir = self
            .relative(path)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let group = self
            .menus
            .entry(dir.clone())
            .or_insert_with(|| MenuGroup::new(dir.clone()));
        group
            .add_manifest(path)
            .map_err(|source| IndexError::Version {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(dir)
    }

    fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path, IndexError> {
        self.config
            .relative_to_current(path)
            .ok_or_else(|| IndexError::OutsideCurrentTree(path.to_path_buf()))
    }

    /// Run every render stage in order. Returns the number of files written.
    pub fn render(&self, storage: &dyn Storage) -> usize {
        RenderStage::ALL
            .into_iter()
            .map(|stage| self.render_stage(stage, storage))
            .sum()
    }

    /// Run a single render stage.
    pub fn render_stage(&self, stage: RenderStage, storage: &dyn Storage) -> usize {
        let ctx = RenderContext::new(&self.config, storage);
        let written: usize = match stage {
            RenderStage::Pages => self.pages.values().map(|p| p.render(&ctx)).sum(),
            RenderStage::Menus => self.menus.values().map(|m| m.render(&ctx)).sum(),
            RenderStage::Landing => render_landing(&ctx),
        };
        tracing::debug!(?stage, written, "Render stage complete");
        written
    }

    /// Re-render one logical page. Returns the number of files written.
    pub fn render_page(&self, path: &Path, storage: &dyn Storage) -> usize {
        self.pages
            .get(path)
            .map_or(0, |page| page.render(&RenderContext::new(&self.config, storage)))
    }

    /// Re-render the manifest group of one directory.
    pub fn render_menu(&self, dir: &Path, storage: &dyn Storage) -> usize {
        self.menus
            .get(dir)
            .map_or(0, |menu| menu.render(&RenderContext::new(&self.config, storage)))
    }
}

#[cfg(test)]
mod tests {
    use verdocs_storage::FsStorage;
    use verdocs_version::DocVersion;

    use super::*;

    fn v(text: &str) -> DocVersion {
        DocVersion::parse(text).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(SiteIndex::classify(Path::new("a/guide.v2.md")), PathKind::Page);
        assert_eq!(SiteIndex::classify(Path::new("a/.pages")), PathKind::Manifest);
        assert_eq!(SiteIndex::classify(Path::new("a/v2.pages")), PathKind::Manifest);
        assert_eq!(SiteIndex::classify(Path::new("a/logo.png")), PathKind::Asset);
        assert_eq!(SiteIndex::classify(Path::new("a/README")), PathKind::Asset);
    }

    #[test]
    fn test_add_groups_variations_by_logical_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(temp_dir.path(), temp_dir.path().join("out"), [v("v1")]);
        let current = config.current_root();
        std::fs::create_dir_all(current.join("guide")).unwrap();
        for file in ["guide/setup.md", "guide/setup.v2.md", "guide/setup.v3.1.md"] {
            std::fs::write(current.join(file), "").unwrap();
        }
        let storage = FsStorage::new();
        let mut index = SiteIndex::new(config);

        for file in ["guide/setup.md", "guide/setup.v2.md", "guide/setup.v3.1.md"] {
            let indexed = index.add(&storage, &current.join(file)).unwrap();
            assert_eq!(indexed, Indexed::Page(PathBuf::from("guide/setup.md")));
        }

        let page = index.page(Path::new("guide/setup.md")).unwrap();
        let versions: Vec<_> = page.variations().keys().map(ToString::to_string).collect();
        assert_eq!(versions, vec!["v1", "v2", "v3.1"]);
        assert_eq!(index.pages().count(), 1);
    }

    #[test]
    fn test_add_manifests_by_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(temp_dir.path(), temp_dir.path().join("out"), [v("v1")]);
        let current = config.current_root();
        let mut index = SiteIndex::new(config);
        let storage = FsStorage::new();

        let root = index.add(&storage, &current.join(".pages")).unwrap();
        let guide = index.add(&storage, &current.join("guide/v2.pages")).unwrap();

        assert_eq!(root, Indexed::Manifest(PathBuf::new()));
        assert_eq!(guide, Indexed::Manifest(PathBuf::from("guide")));
        assert_eq!(
            index.menu(Path::new("guide")).unwrap().resolve(v("v2")),
            Some(current.join("guide/v2.pages").as_path())
        );
        assert_eq!(index.menus().count(), 2);
    }

    #[test]
    fn test_add_asset_is_not_indexed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(temp_dir.path(), temp_dir.path().join("out"), [v("v1")]);
        let current = config.current_root();
        let mut index = SiteIndex::new(config);

        let indexed = index.add(&FsStorage::new(), &current.join("img/logo.png")).unwrap();

        assert_eq!(indexed, Indexed::Asset(PathBuf::from("img/logo.png")));
        assert_eq!(index.pages().count(), 0);
    }

    #[test]
    fn test_add_outside_current_tree_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(temp_dir.path(), temp_dir.path().join("out"), [v("v1")]);
        let outside = config.docs_source().join("index.md");
        let mut index = SiteIndex::new(config);

        let err = index.add(&FsStorage::new(), &outside).unwrap_err();

        assert!(matches!(err, IndexError::OutsideCurrentTree(_)));
    }

    #[test]
    fn test_add_malformed_version_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(temp_dir.path(), temp_dir.path().join("out"), [v("v1")]);
        let current = config.current_root();
        let mut index = SiteIndex::new(config);

        let err = index.add(&FsStorage::new(), &current.join("a.v2.x.md")).unwrap_err();

        assert!(matches!(err, IndexError::Version { .. }));
        assert_eq!(index.pages().count(), 0);
    }

    #[test]
    fn test_render_stage_order() {
        assert_eq!(
            RenderStage::ALL,
            [RenderStage::Pages, RenderStage::Menus, RenderStage::Landing]
        );
    }

    #[test]
    fn test_render_prunes_against_rendered_pages() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new(
            temp_dir.path().join("src"),
            temp_dir.path().join("out"),
            [v("v1"), v("v2")],
        );
        let current = config.current_root();
        let target = config.docs_target();
        std::fs::create_dir_all(&current).unwrap();
        std::fs::write(current.join("a.md"), "A\n").unwrap();
        std::fs::write(current.join("b.v2.md"), "B\n").unwrap();
        std::fs::write(current.join(".pages"), "nav:\n- a.md\n- b.md\n").unwrap();
        let storage = FsStorage::new();
        let mut index = SiteIndex::new(config);
        for file in ["a.md", "b.v2.md", ".pages"] {
            index.add(&storage, &current.join(file)).unwrap();
        }

        let written = index.render(&storage);

        assert_eq!(written, 5);
        assert_eq!(
            std::fs::read_to_string(target.join("v1/.pages")).unwrap(),
            "nav:\n- a.md\n"
        );
        assert_eq!(
            std::fs::read_to_string(target.join("v2/.pages")).unwrap(),
            "nav:\n- a.md\n- b.md\n"
        );
    }
}
