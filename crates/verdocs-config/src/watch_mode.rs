//! Watch mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Whether to build, watch, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchMode {
    /// Build once and exit.
    #[default]
    None,
    /// Skip the initial build and only react to changes.
    WatchOnly,
    /// Build once, then react to changes.
    BuildAndWatch,
}

impl WatchMode {
    /// Parse a mode from free text.
    ///
    /// Only the first character counts, case-insensitively: `w…` selects
    /// [`WatchMode::WatchOnly`], `b…` selects [`WatchMode::BuildAndWatch`],
    /// anything else [`WatchMode::None`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match text.trim_start().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('w') => Self::WatchOnly,
            Some('b') => Self::BuildAndWatch,
            _ => Self::None,
        }
    }

    /// Whether the initial build runs.
    #[must_use]
    pub fn builds(self) -> bool {
        !matches!(self, Self::WatchOnly)
    }

    /// Whether the watch loop runs.
    #[must_use]
    pub fn watches(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for WatchMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_text(s))
    }
}

impl fmt::Display for WatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::WatchOnly => "watch",
            Self::BuildAndWatch => "buildAndWatch",
        })
    }
}

impl<'de> Deserialize<'de> for WatchMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_text(&text))
    }
}
