//! YAML front matter and navigation manifest handling.
//!
//! Pages are markdown files that may start with a YAML front matter block.
//! The preprocessor reads a few keys from it ([`PageFields`]), stamps version
//! information into it and writes the page back with the body untouched.
//! Navigation manifests (`.pages`) are plain YAML mappings.
//!
//! # Example
//!
//! ```
//! use verdocs_meta::{Document, parse_front_matter, write_front_matter};
//!
//! let page = "---\ntitle: Guide\n---\n# Guide\n";
//! let values = parse_front_matter(page).unwrap();
//! let rewritten = write_front_matter(&values, Document::split(page).body).unwrap();
//! assert_eq!(rewritten, page);
//! ```

mod front_matter;
mod yaml;

pub use front_matter::{
    Document, MAX_VERSION_KEY, PageFields, TITLE_KEY, UnquotedDecimal, parse_front_matter,
    write_front_matter,
};
pub use serde_yaml::{Mapping, Value};
pub use yaml::{parse_mapping, to_yaml_string};

/// Error type for front matter and manifest operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Malformed YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Valid YAML whose top level is not a mapping.
    #[error("YAML top level must be a mapping")]
    NotAMapping,
}
