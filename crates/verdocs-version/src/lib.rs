//! Documentation version identifiers.
//!
//! A [`DocVersion`] is a partially specified `major.minor.patch.subpatch` tag
//! printed as `v1`, `v1.2`, `v1.2.3` or `v1.2.3.4`. Components that were not
//! specified are unset: they sort below any specified value at the same
//! position and are omitted when printing.
//!
//! Page files carry their version as a dot-separated infix before the final
//! extension (`guide.v2.md`, `guide.v1.4.md`). [`DocVersion::from_filename`]
//! extracts it and [`strip_version_infix`] derives the version-free name.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use verdocs_version::{DocVersion, strip_version_infix};
//!
//! let path = Path::new("docs/current/guide.v2.md");
//! let version = DocVersion::from_filename(path, "v1").unwrap();
//! assert_eq!(version.to_string(), "v2");
//! assert_eq!(strip_version_infix(path), Path::new("docs/current/guide.md"));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker character preceding the numeric components.
pub const PREFIX: char = 'v';

/// Separator between numeric components.
const SEPARATOR: char = '.';

/// Maximum number of numeric components.
const MAX_COMPONENTS: usize = 4;

/// Error returned when a version string or filename infix is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The text is not a valid version.
    #[error("Invalid version '{input}': {reason}")]
    Format {
        /// Offending input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl VersionError {
    fn format(input: &str, reason: &'static str) -> Self {
        Self::Format {
            input: input.to_owned(),
            reason,
        }
    }
}

/// An ordered documentation version.
///
/// Field order drives the derived ordering: major, then minor, patch and
/// subpatch, first difference wins. `None` sorts below `Some(_)`, so `v1`
/// is lower than `v1.0`. Constructors never produce a specified component
/// after an unset one, which keeps derived equality identical to equality of
/// the printed forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocVersion {
    major: u32,
    minor: Option<u32>,
    patch: Option<u32>,
    subpatch: Option<u32>,
}

impl DocVersion {
    /// Create a version with only the major component set.
    #[must_use]
    pub const fn new(major: u32) -> Self {
        Self {
            major,
            minor: None,
            patch: None,
            subpatch: None,
        }
    }

    /// Smallest valid version, `v1`.
    #[must_use]
    pub const fn first() -> Self {
        Self::new(1)
    }

    /// Sentinel above every real version, used as an open-ended upper bound.
    #[must_use]
    pub const fn last() -> Self {
        Self {
            major: u32::MAX,
            minor: Some(u32::MAX),
            patch: Some(u32::MAX),
            subpatch: Some(u32::MAX),
        }
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component, if specified.
    #[must_use]
    pub const fn minor(&self) -> Option<u32> {
        self.minor
    }

    /// Patch component, if specified.
    #[must_use]
    pub const fn patch(&self) -> Option<u32> {
        self.patch
    }

    /// Subpatch component, if specified.
    #[must_use]
    pub const fn subpatch(&self) -> Option<u32> {
        self.subpatch
    }

    /// Parse `v1`, `1.2`, `v1.2.3.4` and similar.
    ///
    /// An optional leading `v` is followed by one to four dot-separated
    /// non-negative integers.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let digits = text.strip_prefix(PREFIX).unwrap_or(text);
        if digits.is_empty() {
            return Err(VersionError::format(text, "no numeric component"));
        }

        let mut components = [None; MAX_COMPONENTS];
        for (index, part) in digits.split(SEPARATOR).enumerate() {
            if index >= MAX_COMPONENTS {
                return Err(VersionError::format(text, "more than four components"));
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::format(
                    text,
                    "components must be non-negative integers",
                ));
            }
            let value = part
                .parse::<u32>()
                .map_err(|_| VersionError::format(text, "component out of range"))?;
            components[index] = Some(value);
        }

        let [Some(major), minor, patch, subpatch] = components else {
            return Err(VersionError::format(text, "no numeric component"));
        };
        Ok(Self {
            major,
            minor,
            patch,
            subpatch,
        })
    }

    /// Version embedded in a filename, or `fallback` when there is none.
    ///
    /// The version sits between the last `.v` and the final extension:
    /// `doc.v1.2.md` yields `v1.2`. A `.v` that is not followed by a digit
    /// (`setup.vim.md`) is not a version infix. A bare numeric infix such as
    /// `doc.1.2.md` is not recognised either; the fallback applies.
    pub fn from_filename(path: &Path, fallback: &str) -> Result<Self, VersionError> {
        match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(version_infix)
        {
            Some(infix) => Self::parse(&infix.version),
            None => Self::parse(fallback),
        }
    }
}

impl Default for DocVersion {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for DocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.major)?;
        for component in [self.minor, self.patch, self.subpatch]
            .into_iter()
            .map_while(|c| c)
        {
            write!(f, "{SEPARATOR}{component}")?;
        }
        Ok(())
    }
}

impl FromStr for DocVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DocVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DocVersionVisitor)
    }
}

/// Accepts `"v1.2"`, `"1.2"` and bare integers such as `2`. Bare decimals
/// are rejected: `1.10` would arrive as the float `1.1`.
struct DocVersionVisitor;

impl Visitor<'_> for DocVersionVisitor {
    type Value = DocVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a version such as \"v1.2\" or 2")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        DocVersion::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "version {v} was read as a decimal number and may have lost digits \
             (1.10 reads as 1.1); quote it, e.g. \"v{v}\""
        )))
    }
}

/// Location of a version infix inside a filename.
struct VersionInfix {
    /// Byte offset of the `.` that starts the infix.
    start: usize,
    /// Byte offset of the `.` that starts the final extension.
    end: usize,
    /// Version text without the marker.
    version: String,
}

fn version_infix(file_name: &str) -> Option<VersionInfix> {
    let end = file_name.rfind(SEPARATOR)?;
    let stem = &file_name[..end];
    let start = stem.rfind(".v")?;
    let version = &stem[start + 2..];
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| VersionInfix {
            start,
            end,
            version: version.to_owned(),
        })
}

/// Remove the version infix from the filename of `path`.
///
/// `guide.v2.md` becomes `guide.md`; paths without an infix are returned
/// unchanged. Only the final component is inspected.
#[must_use]
pub fn strip_version_infix(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return path.to_path_buf();
    };
    match version_infix(file_name) {
        Some(infix) => {
            let stripped = format!("{}{}", &file_name[..infix.start], &file_name[infix.end..]);
            path.with_file_name(stripped)
        }
        None => path.to_path_buf(),
    }
}
