//! The preprocessing pipeline.
//!
//! A build checks the source layout, copies `mkdocs.yml` and the extra
//! directories, walks `docs/`, files everything below `docs/current/` into
//! the [`SiteIndex`] and copies the rest, then renders the index. Watch mode
//! feeds each changed file back through the same steps, one event at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use verdocs_storage::{
    SourceEvent, SourceEventKind, SourceEventReceiver, Storage, StorageError, WatchHandle,
};

use crate::config::{INDEX_PAGE, MANIFEST_NAME, MKDOCS_CONFIG, SiteConfig};
use crate::render::RenderContext;
use crate::site::{Indexed, RenderStage, SiteIndex};

/// Error that stops the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// `mkdocs.yml` is missing from the source root.
    #[error("mkdocs.yml not found in {}", .0.display())]
    MissingMkdocsConfig(PathBuf),
    /// `docs/` is missing from the source root.
    #[error("docs directory not found in {}", .0.display())]
    MissingDocsDir(PathBuf),
    /// The change watcher could not be started.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Change events were lost.
    #[error("File watcher lost events for {}, restart to resume watching", .0.display())]
    WatchOverflow(PathBuf),
}

impl ProcessError {
    /// Whether the source layout was unusable, so nothing was processed.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingMkdocsConfig(_) | Self::MissingDocsDir(_))
    }
}

/// Outcome of a build or watch session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files written or copied to the target.
    pub files_processed: usize,
}

/// Runs builds and watch sessions for one site.
pub struct Preprocessor {
    storage: Arc<dyn Storage>,
    site: SiteIndex,
    files_processed: usize,
}

impl Preprocessor {
    /// Create a preprocessor.
    #[must_use]
    pub fn new(config: SiteConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            site: SiteIndex::new(config),
            files_processed: 0,
        }
    }

    /// Settings in use.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        self.site.config()
    }

    /// The site index built so far.
    #[must_use]
    pub fn site(&self) -> &SiteIndex {
        &self.site
    }

    /// Files written or copied since creation.
    #[must_use]
    pub fn report(&self) -> BuildReport {
        BuildReport {
            files_processed: self.files_processed,
        }
    }

    /// Fail unless the source root holds `mkdocs.yml` and `docs/`.
    pub fn check_preconditions(&self) -> Result<(), ProcessError> {
        let config = self.config();
        if !self.storage.is_file(&config.mkdocs_source()) {
            return Err(ProcessError::MissingMkdocsConfig(config.source.clone()));
        }
        if !self.storage.is_dir(&config.docs_source()) {
            return Err(ProcessError::MissingDocsDir(config.source.clone()));
        }
        Ok(())
    }

    /// Run a full build.
    ///
    /// Only a missing `mkdocs.yml` or `docs/` fails the build. Any other
    /// filesystem error is logged and the affected file is skipped.
    pub fn process_files(&mut self) -> Result<BuildReport, ProcessError> {
        self.check_preconditions()?;
        let config = self.site.config().clone();
        let storage = Arc::clone(&self.storage);
        let ctx = RenderContext::new(&config, storage.as_ref());

        ctx.create_dir_all(&config.docs_target());
        for &version in &config.versions {
            ctx.create_dir_all(&config.version_root(version));
        }
        self.copy_counted(&config.mkdocs_source(), &config.target.join(MKDOCS_CONFIG));

        for dir in &config.extra_dirs {
            self.copy_tree(&config.source.join(dir));
        }

        for path in ctx.walk(&config.docs_source()) {
            self.handle_one_path(&path);
        }

        self.files_processed += self.site.render(storage.as_ref());
        tracing::info!(
            files = self.files_processed,
            target = %config.target.display(),
            "Build complete"
        );
        Ok(self.report())
    }

    /// Walk `docs/current/` and fill the index without writing anything.
    ///
    /// Watch-only sessions start from here so that a changed page still
    /// resolves against all of its variations.
    pub fn index_sources(&mut self) -> Result<(), ProcessError> {
        self.check_preconditions()?;
        let config = self.site.config().clone();
        let ctx = RenderContext::new(&config, self.storage.as_ref());
        for path in ctx.walk(&config.current_root()) {
            if let Err(e) = self.site.add(self.storage.as_ref(), &path) {
                tracing::warn!(error = %e, "Skipping source file");
            }
        }
        Ok(())
    }

    /// Start watching the source root.
    pub fn watch(&self) -> Result<(SourceEventReceiver, WatchHandle), ProcessError> {
        let source = &self.config().source;
        tracing::info!(source = %source.display(), "Watching for changes");
        Ok(self.storage.watch(source)?)
    }

    /// Process events until the channel closes or events are lost.
    pub fn run_watch(&mut self, events: &SourceEventReceiver) -> Result<BuildReport, ProcessError> {
        while let Some(event) = events.recv() {
            self.handle_event(&event)?;
        }
        Ok(self.report())
    }

    /// React to a single change event.
    pub fn handle_event(&mut self, event: &SourceEvent) -> Result<(), ProcessError> {
        match event.kind {
            SourceEventKind::Overflow => {
                tracing::error!(
                    root = %event.path.display(),
                    "File watcher lost events, restart to resume watching"
                );
                Err(ProcessError::WatchOverflow(event.path.clone()))
            }
            SourceEventKind::Created | SourceEventKind::Modified => {
                if self.storage.is_file(&event.path) {
                    self.handle_changed_path(&event.path);
                }
                Ok(())
            }
        }
    }

    /// Copy or re-render whatever depends on one changed source file.
    fn handle_changed_path(&mut self, path: &Path) {
        let config = self.site.config().clone();
        let storage = Arc::clone(&self.storage);
        let storage = storage.as_ref();

        if path == config.mkdocs_source() {
            self.copy_counted(path, &config.target.join(MKDOCS_CONFIG));
            return;
        }
        if self.is_landing_file(path) {
            self.files_processed += self.site.render_stage(RenderStage::Landing, storage);
            return;
        }
        if config.relative_to_current(path).is_some() {
            match self.site.add(storage, path) {
                Ok(Indexed::Page(page)) => {
                    self.files_processed += self.site.render_page(&page, storage);
                    self.files_processed += self.site.render_stage(RenderStage::Menus, storage);
                    self.files_processed += self.site.render_stage(RenderStage::Landing, storage);
                }
                Ok(Indexed::Manifest(dir)) => {
                    self.files_processed += self.site.render_menu(&dir, storage);
                }
                Ok(Indexed::Asset(rel)) => self.copy_asset(path, &rel),
                Err(e) => tracing::warn!(error = %e, "Skipping source file"),
            }
            return;
        }
        if let Ok(rel) = path.strip_prefix(config.docs_source()) {
            let target = config.docs_target().join(rel);
            self.copy_counted(path, &target);
            return;
        }
        let in_extra_dir = config
            .extra_dirs
            .iter()
            .any(|dir| path.starts_with(config.source.join(dir)));
        if in_extra_dir && let Ok(rel) = path.strip_prefix(&config.source) {
            self.copy_counted(path, &config.target.join(rel));
            return;
        }
        tracing::debug!(path = %path.display(), "Ignoring change outside the source tree");
    }

    /// File one path found by the build walk.
    fn handle_one_path(&mut self, path: &Path) {
        let config = self.site.config().clone();
        if config.relative_to_current(path).is_some() {
            match self.site.add(self.storage.as_ref(), path) {
                Ok(Indexed::Asset(rel)) => self.copy_asset(path, &rel),
                Ok(Indexed::Page(_) | Indexed::Manifest(_)) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping source file"),
            }
        } else if !self.is_landing_file(path)
            && let Ok(rel) = path.strip_prefix(config.docs_source())
        {
            // Landing files are left to the landing stage.
            self.copy_counted(path, &config.docs_target().join(rel));
        }
    }

    /// Copy an asset of the versioned tree into every version directory.
    fn copy_asset(&mut self, path: &Path, rel: &Path) {
        let config = self.site.config().clone();
        for &version in &config.versions {
            self.copy_counted(path, &config.version_root(version).join(rel));
        }
        if config.generate_latest {
            self.copy_counted(path, &config.latest_root().join(rel));
        }
    }

    /// Copy every file below `dir` to the same place below the target root.
    fn copy_tree(&mut self, dir: &Path) {
        let config = self.site.config().clone();
        let paths = RenderContext::new(&config, self.storage.as_ref()).walk(dir);
        for path in paths {
            if let Ok(rel) = path.strip_prefix(&config.source) {
                self.copy_counted(&path, &config.target.join(rel));
            }
        }
    }

    fn copy_counted(&mut self, source: &Path, target: &Path) {
        let ctx = RenderContext::new(self.site.config(), self.storage.as_ref());
        if ctx.copy(source, target) {
            self.files_processed += 1;
        }
    }

    fn is_landing_file(&self, path: &Path) -> bool {
        let docs = self.config().docs_source();
        path == docs.join(INDEX_PAGE) || path == docs.join(MANIFEST_NAME)
    }
}

#[cfg(test)]
mod tests {
    use verdocs_storage::FsStorage;
    use verdocs_version::DocVersion;

    use super::*;

    fn preprocessor(source: &Path, target: &Path) -> Preprocessor {
        let config = SiteConfig::new(source, target, [DocVersion::new(1), DocVersion::new(2)]);
        Preprocessor::new(config, Arc::new(FsStorage::new()))
    }

    #[test]
    fn test_missing_mkdocs_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
        let mut processor = preprocessor(temp_dir.path(), &temp_dir.path().join("out"));

        let err = processor.process_files().unwrap_err();

        assert!(matches!(err, ProcessError::MissingMkdocsConfig(_)));
        assert!(err.is_precondition());
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_docs_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("mkdocs.yml"), "site_name: Test\n").unwrap();
        let mut processor = preprocessor(temp_dir.path(), &temp_dir.path().join("out"));

        let err = processor.process_files().unwrap_err();

        assert!(matches!(err, ProcessError::MissingDocsDir(_)));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_build_copies_layout_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(source.join("docs/current/img")).unwrap();
        std::fs::create_dir_all(source.join("docs/assets")).unwrap();
        std::fs::create_dir_all(source.join("theme_overrides/partials")).unwrap();
        std::fs::write(source.join("mkdocs.yml"), "site_name: Test\n").unwrap();
        std::fs::write(source.join("docs/current/img/logo.png"), "png").unwrap();
        std::fs::write(source.join("docs/assets/site.css"), "css").unwrap();
        std::fs::write(source.join("theme_overrides/partials/footer.html"), "html").unwrap();
        let mut config = SiteConfig::new(&source, &target, [DocVersion::new(1), DocVersion::new(2)]);
        config.extra_dirs = vec!["theme_overrides".to_owned(), "missing".to_owned()];
        let mut processor = Preprocessor::new(config, Arc::new(FsStorage::new()));

        let report = processor.process_files().unwrap();

        // mkdocs.yml, footer, css, logo twice
        assert_eq!(report.files_processed, 5);
        assert!(target.join("mkdocs.yml").is_file());
        assert!(target.join("theme_overrides/partials/footer.html").is_file());
        assert!(target.join("docs/assets/site.css").is_file());
        assert!(target.join("docs/v1/img/logo.png").is_file());
        assert!(target.join("docs/v2/img/logo.png").is_file());
    }

    #[test]
    fn test_failed_copy_does_not_stop_build() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(source.join("docs/current")).unwrap();
        std::fs::write(source.join("mkdocs.yml"), "site_name: Test\n").unwrap();
        std::fs::write(source.join("docs/current/page.md"), "Page\n").unwrap();
        // A directory where mkdocs.yml should go makes that one copy fail.
        std::fs::create_dir_all(target.join("mkdocs.yml")).unwrap();
        let mut processor = preprocessor(&source, &target);

        let report = processor.process_files().unwrap();

        assert_eq!(report.files_processed, 2);
        assert!(target.join("mkdocs.yml").is_dir());
        assert!(target.join("docs/v1/page.md").is_file());
        assert!(target.join("docs/v2/page.md").is_file());
    }

    #[test]
    fn test_build_creates_empty_version_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(source.join("docs")).unwrap();
        std::fs::write(source.join("mkdocs.yml"), "").unwrap();
        let mut processor = preprocessor(&source, &target);

        processor.process_files().unwrap();

        assert!(target.join("docs/v1").is_dir());
        assert!(target.join("docs/v2").is_dir());
    }

    #[test]
    fn test_overflow_ends_watch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut processor = preprocessor(temp_dir.path(), &temp_dir.path().join("out"));
        let (tx, rx) = SourceEventReceiver::channel();
        tx.send(SourceEvent {
            path: temp_dir.path().to_path_buf(),
            kind: SourceEventKind::Overflow,
        })
        .unwrap();

        let err = processor.run_watch(&rx).unwrap_err();

        assert!(matches!(err, ProcessError::WatchOverflow(_)));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_watch_ends_when_channel_closes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut processor = preprocessor(temp_dir.path(), &temp_dir.path().join("out"));
        let (tx, rx) = SourceEventReceiver::channel();
        drop(tx);

        let report = processor.run_watch(&rx).unwrap();

        assert_eq!(report, BuildReport::default());
    }
}
