//! Trie caching with content-fingerprint invalidation
//!
//! Building a trie on every keystroke is wasteful when the key set rarely
//! changes, so one trie is kept per cache key (workspace + selected scope extensions) and
//! rebuilt only when the fingerprint of the backing scopes changes.
//!
//! # Architecture
//!
//! ```text
//! Completion request
//!     ↓
//! Load scope snapshot ── error → propagate, cache untouched
//!     ↓
//! Compute blake3 fingerprint of the snapshot
//!     ↓
//! Lock the per-key slot
//!     ├─ fingerprint matches → return cached trie
//!     └─ missing or stale    → rebuild from scratch, store, return
//! ```
//!
//! # Thread Safety
//!
//! Slots live in a `DashMap`, each behind its own `parking_lot::Mutex`, so
//! requests for different keys never wait on each other and two requests for
//! the same key cannot rebuild it twice.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use blake3::Hash as Blake3Hash;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::trie::PropertyTrie;
use crate::settings::ConfigScope;

/// Fingerprint of a scope snapshot
///
/// Order-sensitive and length-framed: any change to a name, a description,
/// scope membership or the scope count yields a different fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(Blake3Hash);

impl ContentHash {
    pub fn of_scopes(scopes: &[ConfigScope]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(scopes.len() as u64).to_le_bytes());
        for scope in scopes {
            hash_str(&mut hasher, &scope.extension);
            hasher.update(&(scope.entries.len() as u64).to_le_bytes());
            for entry in &scope.entries {
                hash_str(&mut hasher, entry.name());
                match entry.raw_description() {
                    Some(description) => {
                        hasher.update(&[1]);
                        hash_str(&mut hasher, description);
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }
        Self(hasher.finalize())
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Key identifying one cached trie: the owning workspace plus the extensions
/// of the scopes the trie was built from (`None` for the unscoped trie).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub workspace: String,
    pub extension: Option<String>,
}

impl CacheKey {
    pub fn new(workspace: impl Into<String>, extension: Option<String>) -> Self {
        Self {
            workspace: workspace.into(),
            extension,
        }
    }
}

#[derive(Debug)]
struct CachedTrie {
    fingerprint: ContentHash,
    trie: Arc<PropertyTrie>,
}

/// Cache statistics for monitoring and tests
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total number of `get_trie` calls that reached the fingerprint check
    pub total_queries: u64,

    /// Queries answered with the cached trie
    pub hits: u64,

    /// Queries that built a new trie
    pub rebuilds: u64,

    /// Number of keys currently cached
    pub current_size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_queries as f64
        }
    }
}

/// Per-key trie cache
#[derive(Debug)]
pub struct CompletionCache<K = CacheKey>
where
    K: Eq + Hash,
{
    slots: DashMap<K, Arc<Mutex<Option<CachedTrie>>>>,
    total_queries: AtomicU64,
    hits: AtomicU64,
    rebuilds: AtomicU64,
}

impl<K> Default for CompletionCache<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CompletionCache<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            total_queries: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Return the trie for `key`, rebuilding it when the scopes produced by
    /// `load` differ from the ones it was built from.
    ///
    /// A `load` failure is returned unchanged and leaves any cached trie in place.
    pub fn get_trie<E, F>(&self, key: &K, load: F) -> Result<Arc<PropertyTrie>, E>
    where
        F: FnOnce() -> Result<Vec<ConfigScope>, E>,
    {
        let scopes = load()?;
        let fingerprint = ContentHash::of_scopes(&scopes);
        self.total_queries.fetch_add(1, Ordering::Relaxed);

        // Clone the slot handle so the DashMap shard lock is released before
        // taking the per-key lock.
        let slot = self.slots.entry(key.clone()).or_default().clone();
        let mut guard = slot.lock();

        if let Some(cached) = guard.as_ref() {
            if cached.fingerprint == fingerprint {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Trie cache hit for {:?}", key);
                return Ok(Arc::clone(&cached.trie));
            }
        }

        let trie: PropertyTrie = scopes
            .into_iter()
            .flat_map(|scope| scope.entries)
            .collect();
        debug!("Rebuilt trie for {:?} with {} keys", key, trie.len());

        let trie = Arc::new(trie);
        *guard = Some(CachedTrie {
            fingerprint,
            trie: Arc::clone(&trie),
        });
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        Ok(trie)
    }

    /// Fingerprint of the trie currently cached for `key`
    pub fn fingerprint(&self, key: &K) -> Option<ContentHash> {
        let slot = self.slots.get(key)?.clone();
        let guard = slot.lock();
        guard.as_ref().map(|cached| cached.fingerprint)
    }

    /// Drop the trie for `key`; the next query rebuilds it
    pub fn evict(&self, key: &K) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Drop every trie whose key matches `predicate`
    pub fn evict_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&K) -> bool,
    {
        let before = self.slots.len();
        self.slots.retain(|key, _| !predicate(key));
        before - self.slots.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            current_size: self.slots.len(),
        }
    }
}
