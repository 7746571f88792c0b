//! Type cache
//!
//! Memoizes resolution results in two keyspaces: resolved types by
//! syntax-node identity and documentation by symbol identity. Entries
//! expire after a time-to-live, are dropped when the content hash of their
//! file changes, and the lowest-scored fifth is evicted when the cache
//! grows past its limit.

use crate::js_doc::JsDocInfo;
use openpkg_checker::ProgramHost;
use openpkg_spec::ResolvedType;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default time-to-live of an entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of entries per keyspace
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Share of entries removed by one eviction round
const EVICTION_FRACTION: f64 = 0.2;

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
    /// A disabled cache always computes
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Identity of a syntax node: file, node kind and byte range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub file: PathBuf,
    pub kind: &'static str,
    pub start: u32,
    pub end: u32,
}

impl NodeKey {
    pub fn new(file: impl Into<PathBuf>, kind: &'static str, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            kind,
            start,
            end,
        }
    }
}

/// Identity of a symbol: name, flags, declaring file and declaration offset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolKey {
    pub name: String,
    pub flags: u32,
    pub file: PathBuf,
    pub offset: u32,
}

/// A key selecting one of the cache's keyspaces
pub trait CacheKey: Hash + Eq + Clone {
    type Value: Clone;

    fn store(cache: &TypeCache) -> &RefCell<CacheStore<Self, Self::Value>>;

    /// File the cached value was computed from
    fn file(&self) -> &Path;
}

impl CacheKey for NodeKey {
    type Value = ResolvedType;

    fn store(cache: &TypeCache) -> &RefCell<CacheStore<Self, Self::Value>> {
        &cache.nodes
    }

    fn file(&self) -> &Path {
        &self.file
    }
}

impl CacheKey for SymbolKey {
    type Value = JsDocInfo;

    fn store(cache: &TypeCache) -> &RefCell<CacheStore<Self, Self::Value>> {
        &cache.symbols
    }

    fn file(&self) -> &Path {
        &self.file
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted: Instant,
    access_count: u64,
}

impl<V> Entry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted.elapsed() >= ttl
    }

    /// Frequently used, recent entries score high
    fn score(&self) -> f64 {
        self.access_count as f64 / (1.0 + self.inserted.elapsed().as_secs_f64())
    }
}

/// Entries of one keyspace
#[derive(Debug)]
pub struct CacheStore<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Default for CacheStore<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: CacheKey, V: Clone> CacheStore<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&mut self, key: &K, ttl: Duration) -> Lookup<V> {
        match self.entries.get_mut(key) {
            Some(entry) if entry.is_expired(ttl) => {
                self.entries.remove(key);
                Lookup::Expired
            }
            Some(entry) => {
                entry.access_count += 1;
                Lookup::Hit(entry.value.clone())
            }
            None => Lookup::Miss,
        }
    }

    fn insert(&mut self, key: K, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
                access_count: 1,
            },
        );
    }

    /// Remove the lowest-scored fifth once over `max_entries`
    fn evict(&mut self, max_entries: usize) -> usize {
        if self.entries.len() <= max_entries {
            return 0;
        }
        let count = ((self.entries.len() as f64 * EVICTION_FRACTION).ceil() as usize).max(1);
        let mut scored: Vec<(K, f64)> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.score()))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (key, _) in scored.into_iter().take(count) {
            self.entries.remove(&key);
        }
        count
    }

    fn invalidate_file(&mut self, file: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.file() != file);
        before - self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Miss,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub node_entries: usize,
    pub symbol_entries: usize,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
}

/// Resolution cache scoped to one session
#[derive(Debug)]
pub struct TypeCache {
    config: CacheConfig,
    nodes: RefCell<CacheStore<NodeKey, ResolvedType>>,
    symbols: RefCell<CacheStore<SymbolKey, JsDocInfo>>,
    file_hashes: RefCell<HashMap<PathBuf, String>>,
    resolution_depth: Cell<Option<usize>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
    evictions: Cell<u64>,
    expirations: Cell<u64>,
    invalidations: Cell<u64>,
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl TypeCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            nodes: RefCell::default(),
            symbols: RefCell::default(),
            file_hashes: RefCell::default(),
            resolution_depth: Cell::new(None),
            hits: Cell::new(0),
            misses: Cell::new(0),
            evictions: Cell::new(0),
            expirations: Cell::new(0),
            invalidations: Cell::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key`, or compute, store and return it
    ///
    /// No borrow is held while `compute` runs, so it may use the cache itself.
    pub fn get_or_resolve<K: CacheKey>(&self, key: K, compute: impl FnOnce() -> K::Value) -> K::Value {
        if !self.config.enabled {
            return compute();
        }

        let lookup = K::store(self).borrow_mut().lookup(&key, self.config.ttl);
        match lookup {
            Lookup::Hit(value) => {
                self.hits.set(self.hits.get() + 1);
                return value;
            }
            Lookup::Expired => {
                trace!(file = %key.file().display(), "Cache entry expired");
                self.expirations.set(self.expirations.get() + 1);
            }
            Lookup::Miss => {}
        }
        self.misses.set(self.misses.get() + 1);

        let value = compute();
        let mut store = K::store(self).borrow_mut();
        store.insert(key, value.clone());
        let evicted = store.evict(self.config.max_entries);
        if evicted > 0 {
            debug!(evicted, remaining = store.len(), "Evicted cache entries");
            self.evictions.set(self.evictions.get() + evicted as u64);
        }
        value
    }

    /// Cached value without computing; counts as a hit or miss
    pub fn get<K: CacheKey>(&self, key: &K) -> Option<K::Value> {
        if !self.config.enabled {
            return None;
        }
        let lookup = K::store(self).borrow_mut().lookup(key, self.config.ttl);
        match lookup {
            Lookup::Hit(value) => {
                self.hits.set(self.hits.get() + 1);
                Some(value)
            }
            Lookup::Expired => {
                self.expirations.set(self.expirations.get() + 1);
                self.misses.set(self.misses.get() + 1);
                None
            }
            Lookup::Miss => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Drop resolved types when the resolution depth changes
    pub fn set_resolution_depth(&self, depth: usize) {
        if self.resolution_depth.replace(Some(depth)) != Some(depth) {
            self.nodes.borrow_mut().clear();
        }
    }

    /// Remember the content hash of a file
    pub fn track_file(&self, path: &Path, contents: &str) {
        self.file_hashes
            .borrow_mut()
            .insert(path.to_path_buf(), content_hash(contents));
    }

    /// Re-hash every tracked file and drop the entries of files that
    /// changed or vanished; returns those files
    pub fn check_files(&self, host: &dyn ProgramHost) -> Vec<PathBuf> {
        let tracked: Vec<(PathBuf, String)> = self
            .file_hashes
            .borrow()
            .iter()
            .map(|(p, h)| (p.clone(), h.clone()))
            .collect();

        let mut changed = Vec::new();
        for (path, hash) in tracked {
            let current = host.read_file(&path).ok().map(|text| content_hash(&text));
            if current.as_deref() == Some(hash.as_str()) {
                continue;
            }
            let dropped = self.invalidate_file(&path);
            debug!(path = %path.display(), dropped, "File changed, invalidated cache entries");
            match current {
                Some(hash) => {
                    self.file_hashes.borrow_mut().insert(path.clone(), hash);
                }
                None => {
                    self.file_hashes.borrow_mut().remove(&path);
                }
            }
            changed.push(path);
        }
        changed
    }

    /// Drop every entry computed from `file`
    pub fn invalidate_file(&self, file: &Path) -> usize {
        let dropped =
            self.nodes.borrow_mut().invalidate_file(file) + self.symbols.borrow_mut().invalidate_file(file);
        self.invalidations
            .set(self.invalidations.get() + dropped as u64);
        dropped
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.get();
        let misses = self.misses.get();
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
            node_entries: self.nodes.borrow().len(),
            symbol_entries: self.symbols.borrow().len(),
            evictions: self.evictions.get(),
            expirations: self.expirations.get(),
            invalidations: self.invalidations.get(),
        }
    }

    /// Forget all entries, file hashes and statistics
    pub fn clear(&self) {
        self.nodes.borrow_mut().clear();
        self.symbols.borrow_mut().clear();
        self.file_hashes.borrow_mut().clear();
        self.resolution_depth.set(None);
        self.hits.set(0);
        self.misses.set(0);
        self.evictions.set(0);
        self.expirations.set(0);
        self.invalidations.set(0);
    }
}

/// SHA-256 of file contents as lowercase hex
pub fn content_hash(contents: &str) -> String {
    format!("{:x}", Sha256::digest(contents.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpkg_checker::MemoryHost;

    fn node(file: &str, start: u32) -> NodeKey {
        NodeKey::new(file, "TsInterfaceDecl", start, start + 10)
    }

    #[test]
    fn test_hit_does_not_recompute() {
        let cache = TypeCache::default();
        let mut calls = 0;
        let first = cache.get_or_resolve(node("/a.ts", 0), || {
            calls += 1;
            ResolvedType::primitive("string")
        });
        let second = cache.get_or_resolve(node("/a.ts", 0), || {
            calls += 1;
            ResolvedType::primitive("number")
        });

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.node_entries, 1);
    }

    #[test]
    fn test_keyspaces_are_independent() {
        let cache = TypeCache::default();
        cache.get_or_resolve(node("/a.ts", 0), || ResolvedType::primitive("string"));
        let key = SymbolKey {
            name: "User".to_string(),
            flags: 4,
            file: PathBuf::from("/a.ts"),
            offset: 0,
        };
        let doc = cache.get_or_resolve(key.clone(), || JsDocInfo::from_description("A user"));
        assert_eq!(doc.description(), Some("A user"));
        assert_eq!(cache.get(&key).unwrap().description(), Some("A user"));

        let stats = cache.stats();
        assert_eq!(stats.node_entries, 1);
        assert_eq!(stats.symbol_entries, 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = TypeCache::new(CacheConfig {
            ttl: Duration::ZERO,
            ..Default::default()
        });
        let mut calls = 0;
        for _ in 0..2 {
            cache.get_or_resolve(node("/a.ts", 0), || {
                calls += 1;
                ResolvedType::primitive("string")
            });
        }
        assert_eq!(calls, 2);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let cache = TypeCache::new(CacheConfig::disabled());
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_resolve(node("/a.ts", 0), || {
                calls += 1;
                ResolvedType::primitive("string")
            });
        }
        assert_eq!(calls, 3);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_eviction_removes_least_used() {
        let cache = TypeCache::new(CacheConfig {
            max_entries: 10,
            ..Default::default()
        });
        for i in 0..10 {
            cache.get_or_resolve(node("/a.ts", i * 100), || ResolvedType::primitive("string"));
        }
        // Make every existing entry more valuable than the next one
        for i in 0..10 {
            cache.get(&node("/a.ts", i * 100));
        }
        cache.get_or_resolve(node("/a.ts", 5000), || ResolvedType::primitive("number"));

        let stats = cache.stats();
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.node_entries, 8);
        assert!(cache.get(&node("/a.ts", 5000)).is_none());
    }

    #[test]
    fn test_changed_files_invalidate_entries() {
        let cache = TypeCache::default();
        cache.track_file(Path::new("/a.ts"), "export interface A {}");
        cache.track_file(Path::new("/b.ts"), "export interface B {}");
        cache.get_or_resolve(node("/a.ts", 0), || ResolvedType::named("A"));
        cache.get_or_resolve(node("/b.ts", 0), || ResolvedType::named("B"));

        let host = MemoryHost::new()
            .with_file("/a.ts", "export interface A { x: string }")
            .with_file("/b.ts", "export interface B {}");
        assert_eq!(cache.check_files(&host), vec![PathBuf::from("/a.ts")]);
        assert!(cache.get(&node("/a.ts", 0)).is_none());
        assert!(cache.get(&node("/b.ts", 0)).is_some());

        // The new hash is remembered
        assert!(cache.check_files(&host).is_empty());
    }

    #[test]
    fn test_depth_change_clears_resolved_types() {
        let cache = TypeCache::default();
        cache.set_resolution_depth(5);
        cache.get_or_resolve(node("/a.ts", 0), || ResolvedType::named("A"));
        cache.set_resolution_depth(5);
        assert_eq!(cache.stats().node_entries, 1);
        cache.set_resolution_depth(3);
        assert_eq!(cache.stats().node_entries, 0);
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_clear_resets_everything() {
        let cache = TypeCache::default();
        cache.get_or_resolve(node("/a.ts", 0), || ResolvedType::named("A"));
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
