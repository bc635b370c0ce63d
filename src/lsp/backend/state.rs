//! Backend state management
//!
//! This module defines the PropkeyBackend struct, which holds the open document
//! mirrors, the settings store and the key completion engine.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::lsp::document::LspDocument;
use crate::lsp::features::completion::KeyCompletionEngine;
use crate::settings::FileSettingsStore;

/// Workspace identity used before the client names one
pub(super) const DEFAULT_WORKSPACE: &str = "default";

/// The key completion language server backend.
#[derive(Clone)]
pub struct PropkeyBackend {
    pub(super) client: Client,
    pub(super) documents: Arc<RwLock<HashMap<Url, LspDocument>>>,
    pub(super) settings: Arc<FileSettingsStore>,
    pub(super) engine: Arc<KeyCompletionEngine>,
    /// Identity of the workspace this server instance serves (root URI)
    pub(super) workspace: Arc<parking_lot::RwLock<String>>,
}
