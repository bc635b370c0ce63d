use std::path::PathBuf;

use thiserror::Error;

/// Failures reading, writing or importing key settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored settings exist but cannot be decoded
    #[error("settings file {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Imported key list does not match `[ { name, description } ]`
    #[error("{source}")]
    MalformedImport {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("expected a .json key file, got {0:?}")]
    UnsupportedImport(PathBuf),

    /// Import produced no keys for a scope that does not exist yet
    #[error("no keys found in {0:?}")]
    EmptyImport(PathBuf),

    #[error("no scope configured for extension {0:?}")]
    UnknownScope(String),

    #[error("a scope for extension {0:?} already exists")]
    DuplicateScope(String),

    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

impl SettingsError {
    /// Import errors are shown to the user; everything else is logged
    pub fn is_import_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedImport { .. }
                | Self::InvalidEntry { .. }
                | Self::UnsupportedImport(_)
                | Self::EmptyImport(_)
        )
    }
}
