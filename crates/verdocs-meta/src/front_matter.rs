//! YAML front matter at the top of markdown pages.
//!
//! A page starts with front matter when its first line is `---`. The block
//! ends at the next line reading `---` (or `...`). Everything after the
//! closing line is the body and is passed through byte for byte.

use serde_yaml::{Mapping, Value};

use crate::MetaError;
use crate::yaml::{parse_mapping, to_yaml_string};

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Alternative YAML document end marker accepted as a closing line.
const END_MARKER: &str = "...";

/// Key holding the page title.
pub const TITLE_KEY: &str = "title";

/// Key holding the last version a page variation is valid for.
pub const MAX_VERSION_KEY: &str = "max_version";

/// A markdown document split into its front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    /// Raw YAML between the delimiters, if the document has front matter.
    pub front_matter: Option<&'a str>,
    /// Content after the closing delimiter (or the whole text).
    pub body: &'a str,
}

impl<'a> Document<'a> {
    /// Split `content` into front matter and body.
    ///
    /// An opening delimiter without a closing one is not front matter; the
    /// whole text is returned as body.
    #[must_use]
    pub fn split(content: &'a str) -> Self {
        let no_front_matter = Self {
            front_matter: None,
            body: content,
        };

        let mut lines = content.split_inclusive('\n');
        let Some(first) = lines.next() else {
            return no_front_matter;
        };
        if first.trim_end() != DELIMITER {
            return no_front_matter;
        }

        let yaml_start = first.len();
        let mut offset = yaml_start;
        for line in lines {
            let trimmed = line.trim_end();
            if trimmed == DELIMITER || trimmed == END_MARKER {
                return Self {
                    front_matter: Some(&content[yaml_start..offset]),
                    body: &content[offset + line.len()..],
                };
            }
            offset += line.len();
        }

        no_front_matter
    }
}

/// Parse the front matter of a markdown document into a mapping.
///
/// Documents without front matter (or with an empty block) yield an empty
/// mapping.
///
/// # Errors
///
/// Returns an error if the block is not valid YAML or not a mapping.
pub fn parse_front_matter(content: &str) -> Result<Mapping, MetaError> {
    match Document::split(content).front_matter {
        Some(yaml) => parse_mapping(yaml),
        None => Ok(Mapping::new()),
    }
}

/// Render a document from front matter values and a body.
///
/// An empty mapping produces the body alone.
///
/// # Errors
///
/// Returns an error if the values cannot be serialized.
pub fn write_front_matter(values: &Mapping, body: &str) -> Result<String, MetaError> {
    if values.is_empty() {
        return Ok(body.to_owned());
    }
    let yaml = to_yaml_string(values)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// Fields of page front matter the preprocessor reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    /// Page title.
    pub title: Option<String>,
    /// Raw `max_version` text.
    pub max_version: Option<Result<String, UnquotedDecimal>>,
}

impl PageFields {
    /// Extract the known fields from parsed front matter.
    ///
    /// Strings and integers are accepted, so `max_version: 2` and
    /// `max_version: "v2.1"` both work. A bare decimal such as
    /// `max_version: 1.10` is an error: YAML reads it as the float `1.1`.
    #[must_use]
    pub fn from_mapping(values: &Mapping) -> Self {
        Self {
            title: values.get(TITLE_KEY).and_then(scalar_to_string),
            max_version: values
                .get(MAX_VERSION_KEY)
                .and_then(|value| version_text(MAX_VERSION_KEY, value)),
        }
    }
}

/// A version written as a bare decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{key}: {value} was read as a decimal number and may have lost digits; quote it")]
pub struct UnquotedDecimal {
    /// Front matter key.
    pub key: &'static str,
    /// The number as YAML parsed it.
    pub value: String,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn version_text(key: &'static str, value: &Value) -> Option<Result<String, UnquotedDecimal>> {
    match value {
        Value::String(s) => Some(Ok(s.clone())),
        Value::Number(n) if n.is_f64() => Some(Err(UnquotedDecimal {
            key,
            value: n.to_string(),
        })),
        Value::Number(n) => Some(Ok(n.to_string())),
        _ => None,
    }
}
