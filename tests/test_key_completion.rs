/// Integration tests for the key completion pipeline
///
/// Tests verify:
/// - Segment truncation and deduplication of suggestions
/// - Full-match suggestions carrying descriptions and `=` insertion
/// - Line-context gating
/// - Scoped filtering by file extension
/// - Trie rebuilds driven by configuration changes
/// - Settings failures surfacing as errors without poisoning the cache

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use propkey_language_server::lsp::features::completion::{
    CompletionRequest, InsertBehavior, KeyCompletionEngine, ScopeMode,
};
use propkey_language_server::settings::{
    ConfigScope, KeyEntry, MemorySettingsStore, SettingsError, SettingsState, SettingsStore,
};

fn server_keys() -> Vec<KeyEntry> {
    vec![
        KeyEntry::described("server.port", "HTTP port"),
        KeyEntry::new("server.timeout.read", None),
        KeyEntry::new("server.timeout.write", None),
    ]
}

fn store_with(scopes: Vec<ConfigScope>) -> Arc<MemorySettingsStore> {
    Arc::new(MemorySettingsStore::new(SettingsState::new(scopes)))
}

fn request<'a>(file_name: &'a str, line_prefix: &'a str) -> CompletionRequest<'a> {
    CompletionRequest {
        workspace: "file:///workspace",
        file_name,
        line_prefix,
    }
}

fn display_texts(engine: &KeyCompletionEngine, file_name: &str, line: &str) -> Vec<String> {
    engine
        .compute_suggestions(&request(file_name, line))
        .unwrap()
        .into_iter()
        .map(|s| s.display_text)
        .collect()
}

/// Settings store whose reads can be switched to fail
struct FlakyStore {
    inner: MemorySettingsStore,
    failing: AtomicBool,
}

impl SettingsStore for FlakyStore {
    fn snapshot(&self) -> Result<SettingsState, SettingsError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SettingsError::Unavailable("settings service offline".to_string()))
        } else {
            self.inner.snapshot()
        }
    }
}

#[test]
fn test_segment_truncation_deduplicates_partials() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![ConfigScope::new("properties", server_keys())]),
        ScopeMode::Scoped,
    );

    let suggestions = engine
        .compute_suggestions(&request("application.properties", "server."))
        .unwrap();
    assert_eq!(suggestions.len(), 2);

    let partial: Vec<_> = suggestions.iter().filter(|s| s.is_partial).collect();
    let complete: Vec<_> = suggestions.iter().filter(|s| !s.is_partial).collect();
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].display_text, "server.timeout.");
    assert_eq!(partial[0].insert_behavior(), InsertBehavior::Retrigger);
    assert_eq!(partial[0].description(), None);
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].display_text, "server.port");
}

#[test]
fn test_full_match_appends_value_separator() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![ConfigScope::new("properties", server_keys())]),
        ScopeMode::Scoped,
    );

    let suggestions = engine
        .compute_suggestions(&request("application.properties", "server.port"))
        .unwrap();
    assert_eq!(suggestions.len(), 1);

    let only = &suggestions[0];
    assert!(!only.is_partial);
    assert_eq!(only.display_text, "server.port");
    assert_eq!(only.description(), Some("HTTP port"));
    assert_eq!(only.insert_behavior(), InsertBehavior::AppendSeparator);
    assert_eq!(only.insert_text(), "server.port=");
}

#[test]
fn test_context_gating() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![ConfigScope::new("properties", server_keys())]),
        ScopeMode::Scoped,
    );

    assert!(display_texts(&engine, "a.properties", "server.port=8080").is_empty());
    assert!(display_texts(&engine, "a.properties", "# server.").is_empty());
    assert!(display_texts(&engine, "a.properties", "! server.").is_empty());
    assert_eq!(display_texts(&engine, "a.properties", "  server.p"), vec!["server.port"]);
}

#[test]
fn test_unknown_prefix_yields_nothing() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![ConfigScope::new("properties", server_keys())]),
        ScopeMode::Scoped,
    );
    assert!(display_texts(&engine, "a.properties", "client.").is_empty());
    assert!(display_texts(&engine, "a.properties", "server.portx").is_empty());
}

#[test]
fn test_scoped_filtering_by_extension() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![
            ConfigScope::new("properties", vec![KeyEntry::new("a.b", None)]),
            ConfigScope::new("yaml", vec![KeyEntry::new("c.d", None)]),
        ]),
        ScopeMode::Scoped,
    );

    assert_eq!(display_texts(&engine, "app.properties", ""), vec!["a."]);
    assert_eq!(display_texts(&engine, "app.properties", "a."), vec!["a.b"]);
    assert!(display_texts(&engine, "app.properties", "c.").is_empty());
    assert_eq!(display_texts(&engine, "app.yaml", ""), vec!["c."]);
    assert!(display_texts(&engine, "app.json", "").is_empty());
}

#[test]
fn test_global_mode_merges_every_scope() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![
            ConfigScope::new("properties", vec![KeyEntry::new("a.b", None)]),
            ConfigScope::new("yaml", vec![KeyEntry::new("c.d", None)]),
        ]),
        ScopeMode::Global,
    );

    assert_eq!(display_texts(&engine, "notes.txt", ""), vec!["a.", "c."]);
}

#[test]
fn test_configuration_changes_force_one_rebuild() {
    let store = store_with(vec![ConfigScope::new("properties", server_keys())]);
    let engine = KeyCompletionEngine::new(store.clone(), ScopeMode::Scoped);

    let first = display_texts(&engine, "a.properties", "server.");
    let second = display_texts(&engine, "a.properties", "server.");
    assert_eq!(first, second);
    assert_eq!(engine.cache().stats().rebuilds, 1);
    assert_eq!(engine.cache().stats().hits, 1);

    // Description change
    let mut keys = server_keys();
    keys[0] = KeyEntry::described("server.port", "Listening port");
    store.set(SettingsState::new(vec![ConfigScope::new("properties", keys.clone())]));
    let suggestions = engine
        .compute_suggestions(&request("a.properties", "server.port"))
        .unwrap();
    assert_eq!(suggestions[0].description(), Some("Listening port"));
    assert_eq!(engine.cache().stats().rebuilds, 2);

    display_texts(&engine, "a.properties", "server.");
    assert_eq!(engine.cache().stats().rebuilds, 2);

    // New scope, even one that does not apply to this file in global mode
    engine.set_mode(ScopeMode::Global);
    display_texts(&engine, "a.properties", "");
    assert_eq!(engine.cache().stats().rebuilds, 3);
    store.set(SettingsState::new(vec![
        ConfigScope::new("properties", keys),
        ConfigScope::new("yaml", vec![KeyEntry::new("c.d", None)]),
    ]));
    assert_eq!(display_texts(&engine, "a.properties", ""), vec!["c.", "server."]);
    assert_eq!(engine.cache().stats().rebuilds, 4);
}

#[test]
fn test_settings_failure_is_reported_and_cache_survives() {
    let store = Arc::new(FlakyStore {
        inner: MemorySettingsStore::new(SettingsState::new(vec![ConfigScope::new(
            "properties",
            server_keys(),
        )])),
        failing: AtomicBool::new(false),
    });
    let engine = KeyCompletionEngine::new(store.clone(), ScopeMode::Scoped);

    assert_eq!(display_texts(&engine, "a.properties", "server.").len(), 2);

    store.failing.store(true, Ordering::SeqCst);
    let err = engine
        .compute_suggestions(&request("a.properties", "server."))
        .unwrap_err();
    assert!(matches!(err, SettingsError::Unavailable(_)));

    store.failing.store(false, Ordering::SeqCst);
    assert_eq!(display_texts(&engine, "a.properties", "server.").len(), 2);
    let stats = engine.cache().stats();
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_workspaces_have_isolated_tries() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![ConfigScope::new("properties", server_keys())]),
        ScopeMode::Scoped,
    );

    for workspace in ["file:///one", "file:///two"] {
        let request = CompletionRequest {
            workspace,
            file_name: "a.properties",
            line_prefix: "",
        };
        engine.compute_suggestions(&request).unwrap();
    }
    assert_eq!(engine.cache().stats().current_size, 2);

    assert_eq!(engine.dispose_workspace("file:///one"), 1);
    assert_eq!(engine.cache().stats().current_size, 1);
}

#[test]
fn test_nested_extensions_keep_separate_tries() {
    let engine = KeyCompletionEngine::new(
        store_with(vec![
            ConfigScope::new("properties", vec![KeyEntry::new("a.b", None)]),
            ConfigScope::new("local.properties", vec![KeyEntry::new("c.d", None)]),
        ]),
        ScopeMode::Scoped,
    );

    for _ in 0..5 {
        assert_eq!(display_texts(&engine, "app.properties", ""), vec!["a."]);
        assert_eq!(display_texts(&engine, "app.local.properties", ""), vec!["a.", "c."]);
    }

    let stats = engine.cache().stats();
    assert_eq!(stats.total_queries, 10);
    assert_eq!(stats.rebuilds, 2);
    assert_eq!(stats.hits, 8);
    assert_eq!(stats.current_size, 2);
}
