//! Dotted-key completion
//!
//! This module provides:
//! - A character trie over configured keys with stable prefix lookup
//! - Fingerprint-invalidated trie caching per workspace and file extension
//! - Line-context gating (no suggestions after `=`, `#` or `!`)
//! - Segment-aware, deduplicated suggestion construction
//!
//! The pipeline for one request:
//!
//! ```text
//! line text ─→ extract_key_prefix ─→ settings snapshot ─→ ScopeMode::select_scopes
//!          ─→ CompletionCache::get_trie ─→ PropertyTrie::find_by_prefix ─→ build_suggestions
//! ```

pub mod cache;
pub mod context;
pub mod suggestions;
pub mod trie;

pub use cache::{CacheKey, CacheStats, CompletionCache, ContentHash};
pub use context::{extract_key_prefix, ScopeMode};
pub use suggestions::{build_suggestions, InsertBehavior, KeySuggestion};
pub use trie::PropertyTrie;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::settings::{SettingsError, SettingsStore};

/// Everything the engine needs to know about one completion request
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Identity of the owning workspace or session
    pub workspace: &'a str,
    /// Name or path of the edited file
    pub file_name: &'a str,
    /// Text of the current line up to the cursor
    pub line_prefix: &'a str,
}

/// Key completion pipeline bound to one settings store
pub struct KeyCompletionEngine {
    settings: Arc<dyn SettingsStore>,
    cache: CompletionCache,
    mode: RwLock<ScopeMode>,
}

impl KeyCompletionEngine {
    pub fn new(settings: Arc<dyn SettingsStore>, mode: ScopeMode) -> Self {
        Self {
            settings,
            cache: CompletionCache::new(),
            mode: RwLock::new(mode),
        }
    }

    pub fn mode(&self) -> ScopeMode {
        *self.mode.read()
    }

    pub fn set_mode(&self, mode: ScopeMode) {
        *self.mode.write() = mode;
    }

    pub fn cache(&self) -> &CompletionCache {
        &self.cache
    }

    /// Ordered suggestions for the cursor position described by `request`.
    ///
    /// An invalid cursor context or a file with no matching scope yields an
    /// empty list. A settings read failure is returned as an error and does not
    /// touch the cache.
    pub fn compute_suggestions(&self, request: &CompletionRequest<'_>) -> Result<Vec<KeySuggestion>, SettingsError> {
        let Some(prefix) = extract_key_prefix(request.line_prefix) else {
            debug!("Cursor is past the key position, skipping completion");
            return Ok(Vec::new());
        };

        let mode = self.mode();
        let snapshot = self.settings.snapshot()?;
        let scopes = mode.select_scopes(snapshot.scopes, request.file_name);
        if scopes.is_empty() {
            debug!("No key scope configured for {} ({} mode)", request.file_name, mode);
            return Ok(Vec::new());
        }

        let key = CacheKey::new(request.workspace, mode.cache_extension(&scopes));
        let trie = self.cache.get_trie(&key, || Ok::<_, SettingsError>(scopes))?;

        let matches = trie.find_by_prefix(prefix);
        let suggestions = build_suggestions(prefix, &matches);
        debug!(
            "Prefix {:?} matched {} keys, {} suggestions",
            prefix,
            matches.len(),
            suggestions.len()
        );
        Ok(suggestions)
    }

    /// Drop every cached trie of `workspace`
    pub fn dispose_workspace(&self, workspace: &str) -> usize {
        self.cache.evict_where(|key| key.workspace == workspace)
    }
}
