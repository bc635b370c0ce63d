use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use tower_lsp::Client;
use tower_lsp::lsp_types::{
    CompletionList, CompletionResponse, InitializeParams, Position, Range, Url,
};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::lsp::features::completion::{extract_key_prefix, CompletionRequest, KeyCompletionEngine, ScopeMode};
use crate::settings::FileSettingsStore;

mod commands;
mod handlers;
mod state;

pub use commands::{
    IMPORT_KEYS_COMMAND, LIST_SCOPES_COMMAND, RELOAD_SETTINGS_COMMAND, REMOVE_SCOPE_COMMAND, RENAME_SCOPE_COMMAND,
};
pub use state::PropkeyBackend;
use state::DEFAULT_WORKSPACE;

/// Options a client may pass in `initializationOptions`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    pub scope_mode: Option<ScopeMode>,
}

impl PropkeyBackend {
    /// Creates a backend serving completions from `settings` through `engine`.
    pub fn new(client: Client, settings: Arc<FileSettingsStore>, engine: Arc<KeyCompletionEngine>) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            settings,
            engine,
            workspace: Arc::new(parking_lot::RwLock::new(DEFAULT_WORKSPACE.to_string())),
        }
    }

    /// Identity of the served workspace, used as the cache owner
    pub fn workspace_id(&self) -> String {
        self.workspace.read().clone()
    }

    /// Records the workspace identity and client options from `initialize`.
    fn configure(&self, params: &InitializeParams) {
        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.to_string())
            .or_else(|| params.root_uri.as_ref().map(Url::to_string));

        if let Some(root) = root {
            info!("Serving workspace {}", root);
            *self.workspace.write() = root;
        }

        if let Some(options) = params.initialization_options.clone() {
            match serde_json::from_value::<InitializationOptions>(options) {
                Ok(InitializationOptions { scope_mode: Some(mode) }) => {
                    info!("Using {} scope mode from initialization options", mode);
                    self.engine.set_mode(mode);
                }
                Ok(_) => {}
                Err(e) => warn!("Ignoring malformed initialization options: {}", e),
            }
        }
    }

    /// Builds the completion response for `position` in the document at `uri`.
    ///
    /// Every failure degrades to `None`; completion never interrupts editing.
    pub async fn complete_at(&self, uri: &Url, position: Position) -> Option<CompletionResponse> {
        let (file_name, line_prefix) = {
            let documents = self.documents.read().await;
            let Some(doc) = documents.get(uri) else {
                debug!("Document not found: {}", uri);
                return None;
            };
            (doc.file_name(), doc.line_prefix(&position))
        };

        let workspace = self.workspace_id();
        let request = CompletionRequest {
            workspace: &workspace,
            file_name: &file_name,
            line_prefix: &line_prefix,
        };

        let suggestions = match self.engine.compute_suggestions(&request) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("Key completion unavailable for {}: {}", uri, e);
                return None;
            }
        };
        if suggestions.is_empty() {
            return None;
        }

        // LSP columns are UTF-16 code units
        let prefix_len = extract_key_prefix(&line_prefix).map_or(0, |p| p.encode_utf16().count()) as u32;
        let end = line_prefix.encode_utf16().count() as u32;
        let replace_range = Range::new(
            Position::new(position.line, end - prefix_len),
            Position::new(position.line, end),
        );

        let items = suggestions
            .iter()
            .enumerate()
            .map(|(index, suggestion)| suggestion.to_completion_item(replace_range, index))
            .collect();

        // Partial segments change as the user types, so the client must ask again
        Some(CompletionResponse::List(CompletionList {
            is_incomplete: true,
            items,
        }))
    }
}
