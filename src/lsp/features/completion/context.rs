//! Completion context gating and scope selection
//!
//! Key completion is only offered while the cursor is still inside the key
//! part of a line. Once an assignment (`=`) or a comment marker (`#`, `!`)
//! appears before the cursor there is nothing to suggest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::ConfigScope;

/// Characters that end the key position of a line
const KEY_TERMINATORS: [char; 3] = ['=', '#', '!'];

/// Extract the raw key prefix from the line text before the cursor.
///
/// Leading whitespace is ignored. Returns `None` when the cursor is past the
/// key position.
pub fn extract_key_prefix(line_before_cursor: &str) -> Option<&str> {
    let trimmed = line_before_cursor.trim_start();
    if trimmed.contains(KEY_TERMINATORS) {
        None
    } else {
        Some(trimmed)
    }
}

/// How configured scopes are chosen for the file being edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Only scopes whose extension matches the edited file
    #[default]
    Scoped,
    /// Every configured scope, whatever the file type
    Global,
}

impl ScopeMode {
    /// Pick the scopes that feed the trie for `file_name`.
    ///
    /// In scoped mode an empty result means no suggestions should be offered.
    pub fn select_scopes(self, scopes: Vec<ConfigScope>, file_name: &str) -> Vec<ConfigScope> {
        match self {
            ScopeMode::Global => scopes,
            ScopeMode::Scoped => scopes
                .into_iter()
                .filter(|scope| scope.matches_file(file_name))
                .collect(),
        }
    }

    /// Extension component of the cache key for the scopes selected for a file.
    ///
    /// Files selecting the same scopes share a slot; `app.properties` and
    /// `app.local.properties` do not when both `properties` and
    /// `local.properties` are configured.
    pub fn cache_extension(self, selected: &[ConfigScope]) -> Option<String> {
        match self {
            ScopeMode::Global => None,
            ScopeMode::Scoped => Some(
                selected
                    .iter()
                    .map(|scope| scope.extension.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeMode::Scoped => write!(f, "scoped"),
            ScopeMode::Global => write!(f, "global"),
        }
    }
}

impl FromStr for ScopeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scoped" => Ok(ScopeMode::Scoped),
            "global" => Ok(ScopeMode::Global),
            other => Err(format!("unknown scope mode {:?}, expected \"scoped\" or \"global\"", other)),
        }
    }
}
