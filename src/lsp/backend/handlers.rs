//! LSP protocol handlers
//!
//! Implements the `LanguageServer` trait for PropkeyBackend: document
//! synchronization, key completion and scope management commands.

use serde_json::Value;
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionOptionsCompletionItem, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    ExecuteCommandOptions, ExecuteCommandParams, InitializeParams, InitializeResult,
    InitializedParams, MessageType, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind,
};
use tracing::{debug, info, warn};

use super::commands::supported_commands;
use super::state::PropkeyBackend;
use crate::lsp::document::LspDocument;

#[tower_lsp::async_trait]
impl LanguageServer for PropkeyBackend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        info!("Initializing key completion server");
        self.configure(&params);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string()]),
                    all_commit_characters: None,
                    resolve_provider: Some(false),
                    completion_item: Some(CompletionOptionsCompletionItem {
                        label_details_support: Some(true),
                    }),
                    work_done_progress_options: Default::default(),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: supported_commands(),
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let state = self.settings.current();
        info!(
            "Server initialized with {} key scopes ({} mode)",
            state.scopes.len(),
            self.engine.mode()
        );
        self.client
            .log_message(MessageType::INFO, "Key completion server initialized")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        let workspace = self.workspace_id();
        let evicted = self.engine.dispose_workspace(&workspace);
        info!("Shutting down, dropped {} cached tries for {}", evicted, workspace);
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!("Opened document: {}, version: {}", doc.uri, doc.version);
        let document = LspDocument::new(doc.uri.clone(), &doc.text, doc.version);
        self.documents.write().await.insert(doc.uri, document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let mut documents = self.documents.write().await;
        match documents.get_mut(&uri) {
            Some(document) if version > document.version => {
                document.apply(params.content_changes, version);
                debug!("Updated document: {}, version: {}", uri, version);
            }
            Some(document) => {
                warn!(
                    "Ignoring stale change for {}: version {} not newer than {}",
                    uri, version, document.version
                );
            }
            None => {
                warn!("Change for unknown document {}", uri);
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if self.documents.write().await.remove(&uri).is_some() {
            debug!("Closed document: {}", uri);
        } else {
            warn!("Closed document not found: {}", uri);
        }
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Completion request at {}:{:?}", uri, position);
        Ok(self.complete_at(&uri, position).await)
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> LspResult<Option<Value>> {
        info!("Executing command {}", params.command);
        self.run_command(params).await
    }
}
