//! Server configuration
//!
//! Resolution order for each value: command line, then environment, then default.
//!
//! - `PROPKEY_SETTINGS`: path of the settings file
//! - `PROPKEY_SCOPE_MODE`: `scoped` or `global`
//!
//! Clients can still switch the scope mode through `initializationOptions`.

use std::path::PathBuf;

use anyhow::{anyhow, Context};

use crate::lsp::features::completion::ScopeMode;
use crate::settings::default_settings_path;

pub const SETTINGS_PATH_ENV: &str = "PROPKEY_SETTINGS";
pub const SCOPE_MODE_ENV: &str = "PROPKEY_SCOPE_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub settings_path: PathBuf,
    pub scope_mode: ScopeMode,
}

impl ServerConfig {
    /// Resolves the configuration against the process environment.
    pub fn from_env_or_default(cli_settings: Option<PathBuf>, cli_mode: Option<ScopeMode>) -> anyhow::Result<Self> {
        Self::resolve(cli_settings, cli_mode, |name| std::env::var(name).ok())
    }

    /// Resolves the configuration with `env` as the variable lookup.
    pub fn resolve<F>(cli_settings: Option<PathBuf>, cli_mode: Option<ScopeMode>, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = match cli_settings {
            Some(path) => path,
            None => match env(SETTINGS_PATH_ENV).filter(|v| !v.trim().is_empty()) {
                Some(path) => PathBuf::from(path),
                None => default_settings_path()
                    .ok_or_else(|| anyhow!("Unable to determine user config directory; pass --settings"))?,
            },
        };

        let scope_mode = match cli_mode {
            Some(mode) => mode,
            None => match env(SCOPE_MODE_ENV).filter(|v| !v.trim().is_empty()) {
                Some(raw) => raw
                    .parse::<ScopeMode>()
                    .map_err(|e| anyhow!(e))
                    .with_context(|| format!("Invalid {}", SCOPE_MODE_ENV))?,
                None => ScopeMode::default(),
            },
        };

        Ok(Self {
            settings_path,
            scope_mode,
        })
    }
}
