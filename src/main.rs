//! Dotted key completion language server
//!
//! Speaks LSP over stdio. Logs go to stderr and to a session file in the
//! user cache directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;

use propkey_language_server::config::ServerConfig;
use propkey_language_server::logging::init_logger;
use propkey_language_server::lsp::backend::PropkeyBackend;
use propkey_language_server::lsp::features::completion::{KeyCompletionEngine, ScopeMode};
use propkey_language_server::settings::FileSettingsStore;

#[derive(Parser, Debug)]
#[command(name = "propkey-language-server", version, about = "Completion of dotted configuration keys over LSP")]
struct Cli {
    /// Log level filter for stderr (error, warn, info, debug, trace); defaults to RUST_LOG or info
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log file
    #[arg(long)]
    no_file_logging: bool,

    /// Settings file holding the configured key scopes
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Which scopes feed completion: scoped (matching extension) or global
    #[arg(long)]
    scope_mode: Option<ScopeMode>,

    /// Accepted for client compatibility; stdio is the only transport
    #[arg(long, hide = true)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), !cli.no_file_logging)
        .context("Failed to initialize logging")?;

    let config = ServerConfig::from_env_or_default(cli.settings, cli.scope_mode)?;
    info!(
        "Starting {} {} (settings: {:?}, {} mode)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.settings_path,
        config.scope_mode
    );

    let store = Arc::new(
        FileSettingsStore::open(&config.settings_path)
            .with_context(|| format!("Failed to open settings {:?}", config.settings_path))?,
    );
    let engine = Arc::new(KeyCompletionEngine::new(store.clone(), config.scope_mode));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| PropkeyBackend::new(client, store.clone(), engine.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("Server stopped");
    Ok(())
}
