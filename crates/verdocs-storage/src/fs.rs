//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for walking, reading, writing and copying files on
//! the local filesystem, and for watching a source tree with `notify`.

use std::fs;
use std::path::{Path, PathBuf};

use notify::{RecursiveMode, Watcher};

use crate::event::{SourceEvent, SourceEventKind, SourceEventReceiver, WatchHandle};
use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Create a storage error from a notify error.
fn notify_error(e: notify::Error, root: &Path) -> StorageError {
    StorageError::new(StorageErrorKind::Watch)
        .with_path(root)
        .with_source(e)
}

/// Convert a `notify::EventKind` to a `SourceEventKind`.
///
/// Returns `None` for event kinds that are not relevant (e.g., Access, Remove).
fn source_event_kind(kind: notify::EventKind) -> Option<SourceEventKind> {
    match kind {
        notify::EventKind::Create(_) => Some(SourceEventKind::Created),
        notify::EventKind::Modify(_) => Some(SourceEventKind::Modified),
        _ => None,
    }
}

/// Translate a notify callback result into source events.
///
/// A rescan request or a watcher error means events were dropped, which is
/// reported as a single overflow for the watched root.
fn translate_notify_result(
    res: Result<notify::Event, notify::Error>,
    root: &Path,
) -> Vec<SourceEvent> {
    let overflow = || {
        vec![SourceEvent {
            path: root.to_path_buf(),
            kind: SourceEventKind::Overflow,
        }]
    };

    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(root = %root.display(), error = %e, "File watcher error");
            return overflow();
        }
    };

    if event.need_rescan() {
        return overflow();
    }

    let Some(kind) = source_event_kind(event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .into_iter()
        .map(|path| SourceEvent { path, kind })
        .collect()
}

/// Filesystem storage implementation.
///
/// Stateless: every call goes straight to the filesystem.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use verdocs_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new();
/// for file in storage.walk(Path::new("docs"))? {
///     println!("{}", file.display());
/// }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    /// Create a new filesystem storage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Walk a directory recursively and collect regular files.
    ///
    /// Entries are visited in name order, so the result is deterministic.
    fn walk_directory(dir_path: &Path, files: &mut Vec<PathBuf>) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir_path).map_err(|e| StorageError::io(e, dir_path))?;

        // Collect entries with cached file_type to avoid repeated stat calls in sort.
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_type().ok().map(|t| (e.path(), t)))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (path, file_type) in entries {
            if file_type.is_dir() {
                Self::walk_directory(&path, files)?;
            } else if file_type.is_file() || path.is_file() {
                // Symlinks are followed when they point at regular files.
                files.push(path);
            }
        }

        Ok(())
    }

    fn ensure_parent(path: &Path) -> Result<(), StorageError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(e, parent))
            }
            _ => Ok(()),
        }
    }
}

impl Storage for FsStorage {
    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let mut files = Vec::new();
        if root.is_dir() {
            Self::walk_directory(root, &mut files)?;
        }
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::io(e, path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        Self::ensure_parent(path)?;
        fs::write(path, contents).map_err(|e| StorageError::io(e, path))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        // Past this check a failure is reported against the destination.
        if !from.is_file() {
            return Err(StorageError::not_found(from));
        }
        Self::ensure_parent(to)?;
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| StorageError::io(e, to))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(path).map_err(|e| StorageError::io(e, path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn watch(&self, root: &Path) -> Result<(SourceEventReceiver, WatchHandle), StorageError> {
        let (event_tx, receiver) = SourceEventReceiver::channel();
        let watched_root = root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res| {
            for event in translate_notify_result(res, &watched_root) {
                // Receiver gone means the watch loop ended; nothing left to do.
                let _ = event_tx.send(event);
            }
        })
        .map_err(|e| notify_error(e, root))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| notify_error(e, root))?;

        tracing::debug!(root = %root.display(), "Watching source tree");
        Ok((receiver, WatchHandle::new(watcher)))
    }
}
