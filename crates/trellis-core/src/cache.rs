//! LRU cache for resolved views
//!
//! Resolving a list row is the hot path of a render: dashboards re-render on
//! every context refresh while most rows are unchanged. The cache stores the
//! resolved subtree per component identity together with the fingerprint of
//! the data it was resolved from.
//!
//! ## Keys
//!
//! A [`CacheKey`] pairs the component identity (id plus row position) with a
//! [`Fingerprint`] of everything the resolution read: the template subtree,
//! the context snapshot and the row item. One entry is kept per identity; a
//! lookup with a different fingerprint evicts the stale entry and misses.
//!
//! ## Thread Safety
//!
//! All state sits behind a single `parking_lot::Mutex`. Share the cache with
//! `Arc` when sessions render from several threads.
//!
//! The cache is an optimization only. Rendering with or without it produces
//! identical output.

use crate::binder::ResolvedNode;
use crate::error::Diagnostic;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// blake3 digest identifying the data a view was resolved from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn builder() -> FingerprintBuilder {
        FingerprintBuilder {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Fingerprint of a value's JSON encoding.
    pub fn of_json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::builder().json(value).finish()
    }

    /// Order-sensitive combination of several fingerprints.
    pub fn combine(parts: &[Fingerprint]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&part.0);
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex digits, for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

/// Incremental fingerprint construction.
pub struct FingerprintBuilder {
    hasher: blake3::Hasher,
}

impl FingerprintBuilder {
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        // Length prefix keeps ("ab", "c") distinct from ("a", "bc").
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Hash the JSON encoding of a value. serde_json maps keep sorted order,
    /// so equal values hash equally.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(encoded) => self.bytes(&encoded),
            // Non-string map keys are the only failure; hash a marker so the
            // fingerprint stays deterministic.
            Err(_) => self.bytes(b"\0unserializable"),
        }
    }

    pub fn strs<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self = self.bytes(item.as_ref().as_bytes());
        }
        self
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(*self.hasher.finalize().as_bytes())
    }
}

/// Configuration for view caching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached views
    pub capacity: usize,
}

impl CacheConfig {
    /// Enough for a few hundred rows across the screens of one session
    pub fn standard() -> Self {
        Self { capacity: 512 }
    }

    /// Single short screen
    pub fn small() -> Self {
        Self { capacity: 128 }
    }

    /// Long lists, multiple screens kept warm
    pub fn large() -> Self {
        Self { capacity: 4096 }
    }

    /// Memory-constrained devices
    pub fn minimal() -> Self {
        Self { capacity: 32 }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total number of cache lookups
    pub lookups: u64,
    /// Lookups that returned a view
    pub hits: u64,
    /// Lookups that found nothing usable, stale entries included
    pub misses: u64,
    /// Misses caused by a fingerprint change
    pub stale: u64,
    /// Current number of cached views
    pub entries: usize,
}

impl CacheStats {
    /// Cache hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// Cache key: component identity and the fingerprint of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identity: String,
    pub fingerprint: Fingerprint,
}

impl CacheKey {
    pub fn new(identity: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            identity: identity.into(),
            fingerprint,
        }
    }
}

/// A cached resolution: the subtree (absent when a conditional omitted it)
/// plus the diagnostics raised while resolving it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedView {
    pub node: Option<ResolvedNode>,
    pub diagnostics: Vec<Diagnostic>,
}

struct Inner {
    entries: LruCache<String, (Fingerprint, CachedView)>,
    stats: CacheStats,
}

/// Thread-safe LRU cache of resolved views
pub struct ViewCache {
    inner: Mutex<Inner>,
    config: CacheConfig,
}

impl ViewCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_config(CacheConfig { capacity })
    }

    /// A zero capacity is raised to one.
    pub fn with_config(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            config,
        }
    }

    /// Look up a view. An entry for the same identity with another
    /// fingerprint is dropped.
    pub fn get(&self, key: &CacheKey) -> Option<CachedView> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.stats.lookups += 1;

        let cached = inner
            .entries
            .get(&key.identity)
            .map(|(fingerprint, view)| (*fingerprint == key.fingerprint).then(|| view.clone()));

        match cached {
            Some(Some(view)) => {
                inner.stats.hits += 1;
                Some(view)
            }
            Some(None) => {
                inner.entries.pop(&key.identity);
                inner.stats.misses += 1;
                inner.stats.stale += 1;
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store a view, replacing any entry for the same identity. The least
    /// recently used entry is evicted at capacity.
    pub fn put(&self, key: CacheKey, view: CachedView) {
        self.inner
            .lock()
            .entries
            .put(key.identity, (key.fingerprint, view));
    }

    /// Drop the entry for one identity.
    pub fn invalidate(&self, identity: &str) -> bool {
        self.inner.lock().entries.pop(identity).is_some()
    }

    /// Remove all views. Statistics are kept.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn reset_stats(&self) {
        self.inner.lock().stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.entries = inner.entries.len();
        stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}

impl fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{Resolved, ResolvedNode, ResolvedStyle};
    use std::sync::Arc;
    use std::thread;

    fn view(text: &str) -> CachedView {
        CachedView {
            node: Some(ResolvedNode {
                id: "row".to_string(),
                content: Resolved::Text {
                    text: text.to_string(),
                },
                style: ResolvedStyle::default(),
                action: None,
            }),
            diagnostics: Vec::new(),
        }
    }

    fn key(identity: &str, data: &str) -> CacheKey {
        CacheKey::new(identity, Fingerprint::of_bytes(data.as_bytes()))
    }

    #[test]
    fn test_cache_config() {
        assert_eq!(CacheConfig::default().capacity, 512);
        assert_eq!(CacheConfig::small().capacity, 128);
        assert_eq!(CacheConfig::large().capacity, 4096);
        assert_eq!(CacheConfig::minimal().capacity, 32);
    }

    #[test]
    fn test_put_and_get() {
        let cache = ViewCache::new(8);
        assert!(cache.get(&key("jobs[0]", "A")).is_none());

        cache.put(key("jobs[0]", "A"), view("A"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("jobs[0]", "A")), Some(view("A")));
    }

    #[test]
    fn test_changed_fingerprint_is_stale() {
        let cache = ViewCache::new(8);
        cache.put(key("jobs[0]", "A"), view("A"));

        assert!(cache.get(&key("jobs[0]", "B")).is_none());
        assert!(cache.is_empty());
        // The stale entry is gone, so the old fingerprint misses too.
        assert!(cache.get(&key("jobs[0]", "A")).is_none());

        let stats = cache.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.stale, 1);
    }

    #[test]
    fn test_put_overwrites_identity() {
        let cache = ViewCache::new(8);
        cache.put(key("jobs[0]", "A"), view("A"));
        cache.put(key("jobs[0]", "B"), view("B"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("jobs[0]", "B")), Some(view("B")));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ViewCache::new(3);
        for i in 0..4 {
            cache.put(key(&format!("jobs[{i}]"), "x"), view("x"));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key("jobs[0]", "x")).is_none());
        for i in 1..4 {
            assert!(cache.get(&key(&format!("jobs[{i}]"), "x")).is_some());
        }
    }

    #[test]
    fn test_stats_and_reset() {
        let cache = ViewCache::new(8);
        cache.put(key("a", "1"), view("1"));
        cache.get(&key("a", "1"));
        cache.get(&key("b", "1"));

        let stats = cache.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < 1e-10);

        cache.reset_stats();
        assert_eq!(cache.stats().lookups, 0);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ViewCache::new(8);
        cache.put(key("a", "1"), view("1"));
        cache.put(key("b", "1"), view("1"));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let cache = ViewCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ViewCache::new(100));
        let handles: Vec<_> = (0..4)
            .map(|thread_id| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..25 {
                        let k = key(&format!("t{thread_id}[{i}]"), "x");
                        cache.put(k.clone(), view("x"));
                        assert!(cache.get(&k).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn fingerprint_is_order_sensitive() {
        let a = Fingerprint::of_bytes(b"a");
        let b = Fingerprint::of_bytes(b"b");
        assert_ne!(Fingerprint::combine(&[a, b]), Fingerprint::combine(&[b, a]));
        assert_ne!(
            Fingerprint::builder().strs(["ab", "c"]).finish(),
            Fingerprint::builder().strs(["a", "bc"]).finish()
        );
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.short().len(), 12);
    }
}
