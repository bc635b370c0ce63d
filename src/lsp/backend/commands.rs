//! `workspace/executeCommand` handlers for managing key scopes
//!
//! - `propkey.importKeys [extension, path]`: load a JSON key list into a scope
//! - `propkey.removeScope [extension]`: delete a scope
//! - `propkey.renameScope [from, to]`: change the extension of a scope
//! - `propkey.listScopes []`: `[{ extension, count }]`
//! - `propkey.listScopes [extension]`: `[{ name, description }]` preview of one scope
//! - `propkey.reloadSettings []`: re-read the settings file

use std::path::PathBuf;

use serde_json::{json, Value};
use tower_lsp::jsonrpc::{Error as JsonRpcError, Result as LspResult};
use tower_lsp::lsp_types::{ExecuteCommandParams, MessageType};
use tracing::{error, info};

use super::state::PropkeyBackend;
use crate::settings::{import_key_file, SettingsError, DEFAULT_EXTENSION};

pub const IMPORT_KEYS_COMMAND: &str = "propkey.importKeys";
pub const REMOVE_SCOPE_COMMAND: &str = "propkey.removeScope";
pub const RENAME_SCOPE_COMMAND: &str = "propkey.renameScope";
pub const LIST_SCOPES_COMMAND: &str = "propkey.listScopes";
pub const RELOAD_SETTINGS_COMMAND: &str = "propkey.reloadSettings";

/// Commands advertised in the server capabilities
pub(super) fn supported_commands() -> Vec<String> {
    [
        IMPORT_KEYS_COMMAND,
        REMOVE_SCOPE_COMMAND,
        RENAME_SCOPE_COMMAND,
        LIST_SCOPES_COMMAND,
        RELOAD_SETTINGS_COMMAND,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn string_arg(arguments: &[Value], index: usize, name: &str) -> LspResult<String> {
    arguments
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("missing string argument {:?} at position {}", name, index)))
}

/// Accepts `properties`, `.properties` or an empty string (default extension)
fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        trimmed.to_string()
    }
}

impl PropkeyBackend {
    pub(super) async fn run_command(&self, params: ExecuteCommandParams) -> LspResult<Option<Value>> {
        let args = params.arguments;
        match params.command.as_str() {
            IMPORT_KEYS_COMMAND => {
                let extension = normalize_extension(&string_arg(&args, 0, "extension")?);
                let path = PathBuf::from(string_arg(&args, 1, "path")?);
                Ok(self.import_keys(&extension, path).await)
            }
            REMOVE_SCOPE_COMMAND => {
                let extension = normalize_extension(&string_arg(&args, 0, "extension")?);
                match self.settings.remove_scope(&extension) {
                    Ok(()) => {
                        info!("Removed key scope .{}", extension);
                        Ok(Some(json!({ "extension": extension })))
                    }
                    Err(e) => {
                        self.report_failure("Failed to remove key scope", &e).await;
                        Ok(None)
                    }
                }
            }
            RENAME_SCOPE_COMMAND => {
                let from = normalize_extension(&string_arg(&args, 0, "from")?);
                let to = normalize_extension(&string_arg(&args, 1, "to")?);
                match self.settings.rename_scope(&from, &to) {
                    Ok(()) => {
                        info!("Renamed key scope .{} to .{}", from, to);
                        Ok(Some(json!({ "from": from, "to": to })))
                    }
                    Err(e) => {
                        self.report_failure("Failed to rename key scope", &e).await;
                        Ok(None)
                    }
                }
            }
            LIST_SCOPES_COMMAND => {
                let state = self.settings.current();
                match args.first() {
                    None => {
                        let scopes: Vec<Value> = state
                            .scopes
                            .iter()
                            .map(|s| json!({ "extension": s.extension, "count": s.entries.len() }))
                            .collect();
                        Ok(Some(Value::Array(scopes)))
                    }
                    Some(_) => {
                        let extension = normalize_extension(&string_arg(&args, 0, "extension")?);
                        let scope = state
                            .scopes
                            .iter()
                            .find(|s| s.extension == extension)
                            .ok_or_else(|| {
                                JsonRpcError::invalid_params(format!("no scope configured for .{}", extension))
                            })?;
                        let entries: Vec<Value> = scope
                            .entries
                            .iter()
                            .map(|e| json!({ "name": e.name(), "description": e.description() }))
                            .collect();
                        Ok(Some(Value::Array(entries)))
                    }
                }
            }
            RELOAD_SETTINGS_COMMAND => match self.settings.reload() {
                Ok(()) => Ok(Some(json!({ "scopes": self.settings.current().scopes.len() }))),
                Err(e) => {
                    self.report_failure("Failed to reload key settings", &e).await;
                    Ok(None)
                }
            },
            other => Err(JsonRpcError::invalid_params(format!("unknown command {:?}", other))),
        }
    }

    /// Imports a JSON key list into the scope for `extension`.
    ///
    /// Malformed files are reported to the user and leave stored settings untouched.
    async fn import_keys(&self, extension: &str, path: PathBuf) -> Option<Value> {
        let imported = import_key_file(&path).and_then(|entries| {
            let count = entries.len();
            let exists = self.settings.current().scopes.iter().any(|s| s.extension == extension);
            if count == 0 && !exists {
                return Err(SettingsError::EmptyImport(path.clone()));
            }
            self.settings.replace_scope(extension, entries).map(|()| count)
        });

        match imported {
            Ok(count) => {
                info!("Imported {} keys for .{} from {:?}", count, extension, path);
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!("Imported {} keys for .{} files", count, extension),
                    )
                    .await;
                Some(json!({ "extension": extension, "count": count }))
            }
            Err(e) if e.is_import_error() => {
                error!("Rejected key file {:?}: {}", path, e);
                self.client
                    .show_message(
                        MessageType::ERROR,
                        format!(
                            "File didn't have the right format ([ {{ name, description }} ]): {}",
                            e
                        ),
                    )
                    .await;
                None
            }
            Err(e) => {
                self.report_failure("Failed to import keys", &e).await;
                None
            }
        }
    }

    async fn report_failure(&self, action: &str, e: &SettingsError) {
        error!("{}: {}", action, e);
        self.client
            .show_message(MessageType::ERROR, format!("{}: {}", action, e))
            .await;
    }
}
