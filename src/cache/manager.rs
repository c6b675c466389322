//! Cache Manager Module
//!
//! Main cache engine: a key/value map with per-entry TTL, lazy expiry, an
//! explicit sweep and an optional least-recently-used size bound.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock, DEFAULT_TTL_MS};
use crate::error::{CacheError, Result};

// == Cache Config ==
/// Construction parameters for a [`CacheManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL in milliseconds applied when `set` is called without one
    pub default_ttl_ms: u64,
    /// Entry bound; `None` means unbounded (TTL is the only expiry)
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            max_entries: None,
        }
    }
}

impl CacheConfig {
    /// Unbounded cache with the given default TTL.
    pub fn unbounded(default_ttl_ms: u64) -> Self {
        Self {
            default_ttl_ms,
            max_entries: None,
        }
    }

    /// Cache holding at most `max_entries` (minimum 1) entries.
    pub fn bounded(default_ttl_ms: u64, max_entries: usize) -> Self {
        Self {
            default_ttl_ms,
            max_entries: Some(max_entries.max(1)),
        }
    }
}

// == Entry Info ==
/// Metadata of a live entry, as seen at the time of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub timestamp: u64,
    pub ttl: u64,
    pub age: u64,
    pub remaining_ttl: u64,
}

// == Key Validation ==
/// Rejects keys the cache refuses to store.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Value lookup; counted in hit/miss stats
    Get,
    /// Existence check; not counted
    Has,
}

// == Inner State ==
#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    lru: LruTracker,
    stats: CacheStats,
}

impl<T> Inner<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.lru.forget(key);
        }
        removed
    }

    /// Finds a live entry, dropping it first if it turned stale.
    fn lookup(
        &mut self,
        key: &str,
        now: u64,
        access: Access,
        track_recency: bool,
    ) -> Option<&CacheEntry<T>> {
        let stale = match self.entries.get(key) {
            Some(entry) => entry.is_stale_at(now),
            None => {
                if access == Access::Get {
                    self.stats.record_miss();
                }
                return None;
            }
        };

        if stale {
            self.remove(key);
            self.stats.record_expirations(1);
            if access == Access::Get {
                self.stats.record_miss();
            }
            trace!(key = %key, "dropped stale entry on lookup");
            return None;
        }

        if access == Access::Get {
            self.stats.record_hit();
        }
        if track_recency {
            self.lru.touch(key);
        }
        self.entries.get(key)
    }

    /// Removes every stale entry and returns how many went.
    fn sweep(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live_at(now));
        let removed = before - self.entries.len();

        if removed > 0 {
            let entries = &self.entries;
            self.lru.retain(|key| entries.contains_key(key));
            self.stats.record_expirations(removed);
        }
        removed
    }
}

// == Cache Manager ==
/// In-memory key/value cache with per-entry TTL.
///
/// All operations take `&self` and finish without suspending, so one instance
/// can be shared as `Arc<CacheManager<T>>` across request handlers and tasks.
/// Concurrent writers to the same key resolve as last-write-wins.
///
/// Values are returned by clone; store `Arc<V>` to share rather than copy.
#[derive(Debug)]
pub struct CacheManager<T, C = SystemClock> {
    inner: Mutex<Inner<T>>,
    config: CacheConfig,
    clock: C,
}

impl<T> CacheManager<T, SystemClock> {
    /// Creates a cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<T> Default for CacheManager<T, SystemClock> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<T, C: Clock> CacheManager<T, C> {
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(mut config: CacheConfig, clock: C) -> Self {
        config.max_entries = config.max_entries.map(|max| max.max(1));
        Self {
            inner: Mutex::new(Inner::new()),
            config,
            clock,
        }
    }

    // == Set ==
    /// Stores `data` under `key`, replacing any previous entry outright.
    ///
    /// `ttl` is in milliseconds; `None` or `Some(0)` applies the default TTL.
    /// With a size bound, inserting a new key into a full cache first drops
    /// stale entries, then the least recently used ones.
    pub fn set(&self, key: impl Into<String>, data: T, ttl: Option<u64>) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        let ttl = self.effective_ttl(ttl);
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        if let Some(max) = self.config.max_entries {
            if !inner.entries.contains_key(&key) && inner.entries.len() >= max {
                Self::make_room(&mut inner, now, max);
            }
            inner.lru.touch(&key);
        }

        inner.entries.insert(key, CacheEntry::new(data, now, ttl));
        Ok(())
    }

    // == Delete ==
    /// Removes `key` whether live or stale. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.inner.lock().remove(key).is_some();
        if removed {
            debug!(key = %key, "cache entry invalidated");
        }
        removed
    }

    // == Clear ==
    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.lru.clear();
        debug!(count, "cache cleared");
        count
    }

    // == Has ==
    /// Whether `key` holds a live entry. Drops the entry if it turned stale.
    ///
    /// Not counted in hit/miss statistics.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let track = self.tracks_recency();
        self.inner.lock().lookup(key, now, Access::Has, track).is_some()
    }

    // == Clean Expired ==
    /// Removes all stale entries and returns how many were removed.
    pub fn clean_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let removed = self.inner.lock().sweep(now);
        debug!(removed, "expired entries swept");
        removed
    }

    // == Observers ==
    /// Number of stored entries, including stale ones not yet detected.
    pub fn size(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Stored keys in no particular order, including stale ones not yet detected.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Timing metadata for a live entry. Neither a hit nor a recency touch.
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        let now = self.clock.now_ms();
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|entry| entry.is_live_at(now))
            .map(|entry| EntryInfo {
                timestamp: entry.timestamp,
                ttl: entry.ttl,
                age: entry.age_at(now),
                remaining_ttl: entry.remaining_ttl_at(now),
            })
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.entries.len();
        stats
    }

    pub fn default_ttl(&self) -> u64 {
        self.config.default_ttl_ms
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.config.max_entries
    }

    /// TTL that `set` would apply for the given argument.
    pub fn effective_ttl(&self, ttl: Option<u64>) -> u64 {
        match ttl {
            Some(ms) if ms > 0 => ms,
            _ => self.config.default_ttl_ms,
        }
    }

    // == Helpers ==
    fn tracks_recency(&self) -> bool {
        self.config.max_entries.is_some()
    }

    fn make_room(inner: &mut Inner<T>, now: u64, max: usize) {
        let swept = inner.sweep(now);
        if swept > 0 {
            debug!(swept, "dropped stale entries to make room");
        }

        while inner.entries.len() >= max {
            let Some(victim) = inner.lru.pop_least_recent() else {
                break;
            };
            inner.entries.remove(&victim);
            inner.stats.record_eviction();
            debug!(key = %victim, "evicted least recently used entry");
        }
    }
}

impl<T: Clone, C: Clock> CacheManager<T, C> {
    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// A stale entry is removed as part of the call and reported as absent.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        let track = self.tracks_recency();
        self.inner
            .lock()
            .lookup(key, now, Access::Get, track)
            .map(|entry| entry.data.clone())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    fn manual_cache<T>(config: CacheConfig) -> (CacheManager<T, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (CacheManager::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_set_and_get() {
        let (cache, _) = manual_cache(CacheConfig::default());

        cache.set("user:1", "Ada".to_string(), None).unwrap();

        assert_eq!(cache.get("user:1"), Some("Ada".to_string()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_get_missing() {
        let (cache, _) = manual_cache::<u32>(CacheConfig::default());

        assert_eq!(cache.get("nope"), None);
        assert!(!cache.has("nope"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let (cache, _) = manual_cache(CacheConfig::default());

        let result = cache.set("", 1, None);

        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_ttl_applies_for_none_and_zero() {
        let (cache, _) = manual_cache(CacheConfig::unbounded(2_000));

        cache.set("a", 1, None).unwrap();
        cache.set("b", 2, Some(0)).unwrap();
        cache.set("c", 3, Some(10)).unwrap();

        assert_eq!(cache.entry_info("a").unwrap().ttl, 2_000);
        assert_eq!(cache.entry_info("b").unwrap().ttl, 2_000);
        assert_eq!(cache.entry_info("c").unwrap().ttl, 10);
    }

    #[test]
    fn test_default_config_is_five_minutes_unbounded() {
        let cache: CacheManager<u8> = CacheManager::default();

        assert_eq!(cache.default_ttl(), 300_000);
        assert_eq!(cache.max_entries(), None);
    }

    #[test]
    fn test_ttl_boundary_and_lazy_eviction() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("user:42", json!({"name": "Ada"}), Some(1_000)).unwrap();

        clock.advance(1_000);
        assert_eq!(cache.get("user:42"), Some(json!({"name": "Ada"})));

        clock.advance(1);
        assert_eq!(cache.size(), 1, "stale entry is still stored until observed");
        assert_eq!(cache.get("user:42"), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_has_evicts_stale_entry() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("k", 1, Some(50)).unwrap();
        assert!(cache.has("k"));

        clock.advance(51);
        assert!(!cache.has("k"));
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_overwrite_resets_timestamp() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("k", "v1", Some(100)).unwrap();
        let first = cache.entry_info("k").unwrap().timestamp;

        clock.advance(80);
        cache.set("k", "v2", Some(100)).unwrap();

        let info = cache.entry_info("k").unwrap();
        assert_eq!(info.timestamp, first + 80);
        assert_eq!(cache.get("k"), Some("v2"));
        assert_eq!(cache.size(), 1);

        // Past the first entry's deadline but within the second's
        clock.advance(50);
        assert_eq!(cache.get("k"), Some("v2"));
    }

    #[test]
    fn test_delete_reports_presence() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("live", 1, None).unwrap();
        cache.set("stale", 2, Some(1)).unwrap();
        clock.advance(10);

        assert!(cache.delete("live"));
        assert!(cache.delete("stale"), "delete removes stale entries too");
        assert!(!cache.delete("live"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (cache, _) = manual_cache(CacheConfig::default());

        assert_eq!(cache.clear(), 0);
        cache.set("a", 1, None).unwrap();
        cache.set("b", 2, None).unwrap();

        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.size(), 0);
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn test_keys_include_undetected_stale_entries() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("a", 1, Some(10)).unwrap();
        cache.set("b", 2, None).unwrap();
        clock.advance(20);

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_clean_expired_removes_only_stale() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("short", 1, Some(100)).unwrap();
        cache.set("long", 2, Some(10_000)).unwrap();
        cache.set("default", 3, None).unwrap();
        clock.advance(500);

        assert_eq!(cache.clean_expired(), 1);
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("long"), Some(2));
        assert_eq!(cache.get("default"), Some(3));

        assert_eq!(cache.clean_expired(), 0, "second sweep is a no-op");
    }

    #[test]
    fn test_entry_info_for_stale_entry_is_none() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("k", 1, Some(100)).unwrap();
        clock.advance(40);

        let info = cache.entry_info("k").unwrap();
        assert_eq!(info.age, 40);
        assert_eq!(info.remaining_ttl, 60);

        clock.advance(100);
        assert!(cache.entry_info("k").is_none());
        assert_eq!(cache.size(), 1, "entry_info does not evict");
    }

    #[test]
    fn test_stats_counts_get_only() {
        let (cache, clock) = manual_cache(CacheConfig::default());

        cache.set("k", 1, Some(10)).unwrap();
        cache.get("k");
        cache.get("missing");
        cache.has("k");
        clock.advance(11);
        cache.get("k");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_bounded_evicts_least_recently_used() {
        let (cache, _) = manual_cache(CacheConfig::bounded(10_000, 3));

        cache.set("a", 1, None).unwrap();
        cache.set("b", 2, None).unwrap();
        cache.set("c", 3, None).unwrap();
        cache.get("a");
        cache.set("d", 4, None).unwrap();

        assert_eq!(cache.size(), 3);
        assert!(!cache.has("b"));
        assert!(cache.has("a"));
        assert!(cache.has("c"));
        assert!(cache.has("d"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_bounded_prefers_dropping_stale_entries() {
        let (cache, clock) = manual_cache(CacheConfig::bounded(10_000, 2));

        cache.set("old", 1, None).unwrap();
        cache.set("short", 2, Some(5)).unwrap();
        clock.advance(10);
        cache.set("new", 3, None).unwrap();

        assert!(cache.has("old"), "live entry survives while a stale one can go");
        assert!(cache.has("new"));
        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_bounded_overwrite_never_evicts() {
        let (cache, _) = manual_cache(CacheConfig::bounded(10_000, 2));

        cache.set("a", 1, None).unwrap();
        cache.set("b", 2, None).unwrap();
        cache.set("a", 10, None).unwrap();

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_bounded_zero_is_clamped_to_one() {
        let (cache, _) = manual_cache(CacheConfig {
            default_ttl_ms: 1_000,
            max_entries: Some(0),
        });

        cache.set("a", 1, None).unwrap();
        cache.set("b", 2, None).unwrap();

        assert_eq!(cache.max_entries(), Some(1));
        assert_eq!(cache.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn test_shared_across_threads_last_write_wins() {
        let cache = Arc::new(CacheManager::<usize>::new(CacheConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.set(format!("thread:{}", i), i, None).unwrap();
                    cache.set("shared", i, None).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 9);
        let shared = cache.get("shared").unwrap();
        assert!(shared < 8);
        cache.set("shared", 99, None).unwrap();
        assert_eq!(cache.get("shared"), Some(99));
    }
}
