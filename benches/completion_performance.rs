//! Benchmark suite for dotted key completion
//!
//! This benchmark measures:
//! - Trie construction for growing key sets
//! - Prefix lookup in the trie against a linear scan of the key list
//! - The full request pipeline with a warm cache

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use propkey_language_server::lsp::features::completion::{
    build_suggestions, CompletionRequest, KeyCompletionEngine, PropertyTrie, ScopeMode,
};
use propkey_language_server::settings::{ConfigScope, KeyEntry, MemorySettingsStore, SettingsState};

/// Generate `count` keys shaped like `group03.module12.option07`
fn generate_keys(count: usize) -> Vec<KeyEntry> {
    (0..count)
        .map(|i| {
            let name = format!("group{:02}.module{:02}.option{:02}", i % 20, (i / 20) % 50, i % 17);
            if i % 3 == 0 {
                KeyEntry::described(name, format!("Option number {}", i))
            } else {
                KeyEntry::new(name, None)
            }
        })
        .collect()
}

fn bench_trie_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("trie_build");

    for size in &[100, 1_000, 10_000] {
        let keys = generate_keys(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| black_box(keys.iter().cloned().collect::<PropertyTrie>()));
        });
    }

    group.finish();
}

fn bench_prefix_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_lookup");

    for size in &[1_000, 10_000] {
        let keys = generate_keys(*size);
        let trie: PropertyTrie = keys.iter().cloned().collect();

        for prefix in &["group0", "group07.module1", "group07.module12.op"] {
            let label = format!("{}/{}", size, prefix);

            group.bench_with_input(BenchmarkId::new("trie", &label), prefix, |b, p| {
                b.iter(|| trie.find_by_prefix(black_box(p)));
            });

            group.bench_with_input(BenchmarkId::new("linear_scan", &label), prefix, |b, p| {
                b.iter(|| {
                    keys.iter()
                        .filter(|k| k.name().starts_with(black_box(*p)))
                        .cloned()
                        .collect::<Vec<_>>()
                });
            });
        }
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");

    let store = Arc::new(MemorySettingsStore::new(SettingsState::new(vec![ConfigScope::new(
        "properties",
        generate_keys(10_000),
    )])));
    let engine = KeyCompletionEngine::new(store, ScopeMode::Scoped);

    for line in &["", "group0", "group07.", "group07.module12.option0"] {
        let request = CompletionRequest {
            workspace: "bench",
            file_name: "application.properties",
            line_prefix: line,
        };
        group.bench_with_input(BenchmarkId::new("warm_cache", line), &request, |b, r| {
            b.iter(|| engine.compute_suggestions(black_box(r)));
        });
    }

    let matches = generate_keys(10_000);
    group.bench_function("build_suggestions_root", |b| {
        b.iter(|| build_suggestions(black_box(""), &matches));
    });

    group.finish();
}

criterion_group!(benches, bench_trie_build, bench_prefix_lookup, bench_full_pipeline);

criterion_main!(benches);
