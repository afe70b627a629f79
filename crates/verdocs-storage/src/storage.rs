//! Storage trait and error types.
//!
//! Provides the [`Storage`] trait the preprocessor uses for every filesystem
//! interaction (walking the source tree, reading, writing, copying and
//! watching), along with [`StorageError`] for unified error handling.
//!
//! # Path Convention
//!
//! Unlike URL-addressed document stores, all paths here are plain filesystem
//! paths. Callers compute source and target locations themselves.

use std::path::{Path, PathBuf};

use crate::event::{SourceEventReceiver, WatchHandle};

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Resource already exists.
    AlreadyExists,
    /// Change notification could not be set up.
    Watch,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and underlying source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// Path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: message (path: /foo/bar)"
        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::Watch => "Watch failed",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Filesystem abstraction used by the preprocessor.
///
/// Every output is a regenerated build artifact, so writes overwrite in place
/// and create missing parent directories.
pub trait Storage: Send + Sync {
    /// List all regular files below `root`, recursively, in a stable order.
    ///
    /// A missing `root` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if `root` exists but cannot be listed.
    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, StorageError>;

    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Write text to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a directory or the file can't be written.
    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Copy a file, creating parent directories and replacing the target.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the source can't be read or the target
    /// can't be written.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Create a directory and all of its parents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory can't be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), StorageError>;

    /// Check whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Watch `root` recursively for created and modified files.
    ///
    /// Returns a receiver for [`SourceEvent`](crate::SourceEvent)s and a
    /// handle that stops watching when dropped. The default implementation
    /// never yields events, for backends without change notification.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the watcher cannot be started.
    fn watch(&self, root: &Path) -> Result<(SourceEventReceiver, WatchHandle), StorageError> {
        let _ = root;
        Ok((SourceEventReceiver::no_op(), WatchHandle::no_op()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_kind() {
        let err = StorageError::io(
            std::io::Error::from(std::io::ErrorKind::NotFound),
            "/docs/a.md",
        );
        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("/docs/a.md")));

        let err = StorageError::io(
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            "/docs/a.md",
        );
        assert_eq!(err.kind(), &StorageErrorKind::PermissionDenied);
    }

    #[test]
    fn test_display_includes_kind_source_and_path() {
        let err = StorageError::io(std::io::Error::other("disk full"), "/out/v1/a.md");
        assert_eq!(err.to_string(), "Error: disk full (path: /out/v1/a.md)");
    }

    #[test]
    fn test_display_without_source() {
        let err = StorageError::not_found("/missing");
        assert_eq!(err.to_string(), "Not found (path: /missing)");
    }

    #[test]
    fn test_error_source_is_exposed() {
        use std::error::Error as _;

        let err = StorageError::io(std::io::Error::other("boom"), "/x");
        assert!(err.source().is_some());
        assert!(StorageError::not_found("/x").source().is_none());
    }
}
