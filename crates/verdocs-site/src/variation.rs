//! One physical file realizing a logical page.

use std::path::{Path, PathBuf};

use verdocs_meta::{Mapping, PageFields, parse_front_matter};
use verdocs_storage::Storage;
use verdocs_version::{DocVersion, VersionError};

/// Version assumed for page files without a version infix.
pub(crate) const UNVERSIONED: &str = "v1";

/// A source file valid for the versions `min_version..=max_version`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageVariation {
    /// Path of the source file.
    pub source: PathBuf,
    /// First version the file applies to, taken from its filename.
    pub min_version: DocVersion,
    /// Last version the file applies to, from its `max_version` front matter.
    pub max_version: DocVersion,
    /// Title from front matter.
    pub title: Option<String>,
}

impl PageVariation {
    /// Create an open-ended variation without a title.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, min_version: DocVersion) -> Self {
        Self {
            source: source.into(),
            min_version,
            max_version: DocVersion::last(),
            title: None,
        }
    }

    /// Set the last version this variation applies to.
    #[must_use]
    pub fn with_max_version(mut self, max_version: DocVersion) -> Self {
        self.max_version = max_version;
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Build a variation from a page file.
    ///
    /// The minimum version comes from the filename (`v1` when it has no
    /// infix). Title and maximum version come from the file's front matter;
    /// an unreadable file or front matter leaves them unset, and a malformed
    /// `max_version` leaves the range open-ended. Both cases are logged.
    pub fn load(storage: &dyn Storage, source: &Path) -> Result<Self, VersionError> {
        let min_version = DocVersion::from_filename(source, UNVERSIONED)?;
        let values = read_front_matter(storage, source);
        let fields = PageFields::from_mapping(&values);

        let max_version = match fields.max_version {
            None => DocVersion::last(),
            Some(Ok(text)) => DocVersion::parse(&text).unwrap_or_else(|e| open_ended(source, &e)),
            Some(Err(e)) => open_ended(source, &e),
        };

        Ok(Self {
            source: source.to_path_buf(),
            min_version,
            max_version,
            title: fields.title,
        })
    }

    /// Whether `version` lies within `min_version..=max_version`.
    #[must_use]
    pub fn covers(&self, version: DocVersion) -> bool {
        self.min_version <= version && version <= self.max_version
    }
}

fn open_ended(source: &Path, error: &dyn std::fmt::Display) -> DocVersion {
    tracing::warn!(
        path = %source.display(),
        error = %error,
        "Ignoring malformed max_version"
    );
    DocVersion::last()
}

fn read_front_matter(storage: &dyn Storage, source: &Path) -> Mapping {
    let content = match storage.read(source) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %source.display(), error = %e, "Failed to read page");
            return Mapping::new();
        }
    };
    parse_front_matter(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %source.display(), error = %e, "Failed to parse front matter");
        Mapping::new()
    })
}
