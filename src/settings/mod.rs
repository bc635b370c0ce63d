//! Key settings: the data model, its persistence and the JSON import path.

pub mod error;
pub mod import;
pub mod model;
pub mod store;

pub use error::SettingsError;
pub use import::{import_key_file, parse_key_entries};
pub use model::{ConfigScope, KeyEntry, SettingsState, DEFAULT_EXTENSION};
pub use store::{default_settings_path, FileSettingsStore, MemorySettingsStore, SettingsStore};
