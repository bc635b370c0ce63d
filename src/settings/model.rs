//! Settings data model: key entries grouped into per-extension scopes.

use serde::{Deserialize, Serialize};

/// Extension assigned to a scope when none is given
pub const DEFAULT_EXTENSION: &str = "properties";

/// A configurable key name plus an optional human-readable description.
///
/// Entries are immutable once constructed and compare by value, so two entries
/// with the same name and description are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl KeyEntry {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Convenience constructor for an entry carrying a description
    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, Some(description.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw description as stored, possibly blank
    pub fn raw_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Description if present and not blank
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }

    pub fn has_description(&self) -> bool {
        self.description().is_some()
    }
}

/// A group of key entries bound to one file extension (without the leading dot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigScope {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub entries: Vec<KeyEntry>,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for ConfigScope {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            entries: Vec::new(),
        }
    }
}

impl ConfigScope {
    pub fn new(extension: impl Into<String>, entries: Vec<KeyEntry>) -> Self {
        Self {
            extension: extension.into(),
            entries,
        }
    }

    /// True when `file_name` ends with `.` followed by this scope's extension
    pub fn matches_file(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.extension.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
    }
}

/// Snapshot of every configured scope, in user-defined order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsState {
    #[serde(default)]
    pub scopes: Vec<ConfigScope>,
}

impl SettingsState {
    pub fn new(scopes: Vec<ConfigScope>) -> Self {
        Self { scopes }
    }

    /// Total number of entries across all scopes
    pub fn entry_count(&self) -> usize {
        self.scopes.iter().map(|s| s.entries.len()).sum()
    }
}
