//! Persistent storage of key scopes
//!
//! Settings are kept in memory and written to a JSON file on every change.
//!
//! - Location: `~/.config/propkey/settings.json` unless overridden
//! - Format: `{ "version": 1, "scopes": [ { "extension", "entries" } ] }`
//! - Atomic writes: tmp file + rename, so a crash never leaves a truncated file
//! - Failed writes leave the in-memory state untouched

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SettingsError;
use super::model::{ConfigScope, KeyEntry, SettingsState};

/// Current settings file format version
const SETTINGS_VERSION: u32 = 1;

/// Read access to the configured scopes.
///
/// The completion pipeline calls [`SettingsStore::snapshot`] on every request,
/// so implementations should serve it from memory.
pub trait SettingsStore: Send + Sync {
    fn snapshot(&self) -> Result<SettingsState, SettingsError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    version: u32,
    #[serde(flatten)]
    state: SettingsState,
}

/// Get the default settings file path in the user-specific OS config directory
/// - Linux: ~/.config/propkey/settings.json
/// - macOS: ~/Library/Application Support/propkey/settings.json
/// - Windows: %APPDATA%\propkey\settings.json
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("propkey").join("settings.json"))
}

/// JSON-file backed settings store
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    state: RwLock<SettingsState>,
}

impl FileSettingsStore {
    /// Open the store at `path`, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let state = read_settings_file(&path)?;
        info!(
            "Loaded {} scopes ({} keys) from {:?}",
            state.scopes.len(),
            state.entry_count(),
            path
        );
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory state
    pub fn current(&self) -> SettingsState {
        self.state.read().clone()
    }

    /// Re-read the file, replacing the in-memory state only on success
    pub fn reload(&self) -> Result<(), SettingsError> {
        let state = read_settings_file(&self.path)?;
        *self.state.write() = state;
        debug!("Reloaded settings from {:?}", self.path);
        Ok(())
    }

    /// Replace the entries of the scope for `extension`, creating the scope if needed
    pub fn replace_scope(&self, extension: &str, entries: Vec<KeyEntry>) -> Result<(), SettingsError> {
        self.update(|state| {
            match state.scopes.iter_mut().find(|s| s.extension == extension) {
                Some(scope) => scope.entries = entries,
                None => state.scopes.push(ConfigScope::new(extension, entries)),
            }
            Ok(())
        })
    }

    /// Remove the scope for `extension`
    pub fn remove_scope(&self, extension: &str) -> Result<(), SettingsError> {
        self.update(|state| {
            let before = state.scopes.len();
            state.scopes.retain(|s| s.extension != extension);
            if state.scopes.len() == before {
                return Err(SettingsError::UnknownScope(extension.to_string()));
            }
            Ok(())
        })
    }

    /// Move the entries of the scope for `from` to the extension `to`
    pub fn rename_scope(&self, from: &str, to: &str) -> Result<(), SettingsError> {
        self.update(|state| {
            if from != to && state.scopes.iter().any(|s| s.extension == to) {
                return Err(SettingsError::DuplicateScope(to.to_string()));
            }
            match state.scopes.iter_mut().find(|s| s.extension == from) {
                Some(scope) => {
                    scope.extension = to.to_string();
                    Ok(())
                }
                None => Err(SettingsError::UnknownScope(from.to_string())),
            }
        })
    }

    /// Apply `change` to a copy of the state, persist it, then publish it
    fn update<F>(&self, change: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut SettingsState) -> Result<(), SettingsError>,
    {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        change(&mut next)?;
        write_settings_file(&self.path, &next)?;
        *guard = next;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn snapshot(&self) -> Result<SettingsState, SettingsError> {
        Ok(self.current())
    }
}

/// In-memory settings store with no persistence
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    state: RwLock<SettingsState>,
}

impl MemorySettingsStore {
    pub fn new(state: SettingsState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn set(&self, state: SettingsState) {
        *self.state.write() = state;
    }
}

impl SettingsStore for MemorySettingsStore {
    fn snapshot(&self) -> Result<SettingsState, SettingsError> {
        Ok(self.state.read().clone())
    }
}

fn read_settings_file(path: &Path) -> Result<SettingsState, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings file at {:?}, starting empty", path);
            return Ok(SettingsState::default());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let file: SettingsFile = serde_json::from_str(&content).map_err(|source| SettingsError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    if file.version != SETTINGS_VERSION {
        warn!(
            "Settings file {:?} has version {}, expected {}; reading anyway",
            path, file.version, SETTINGS_VERSION
        );
    }

    Ok(file.state)
}

fn write_settings_file(path: &Path, state: &SettingsState) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let file = SettingsFile {
        version: SETTINGS_VERSION,
        state: state.clone(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;

    debug!("Wrote {} scopes to {:?}", state.scopes.len(), path);
    Ok(())
}
