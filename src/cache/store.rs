//! Cache Store Module
//!
//! Main cache engine: a lock-guarded HashMap with lazy expiration and
//! read-through loading.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::flight::InFlight;
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats, Cacheable};
use crate::config::CacheConfig;

// == Cache ==
/// Thread-safe cache with lazy population and lazy expiration.
///
/// A single reader/writer lock guards the whole map. Lookups share the lock
/// and never block each other; `set` and `flush` take it exclusively. The
/// lock is never held while a loader runs.
///
/// Expired entries are not removed when they expire. They read as absent and
/// stay in the map until overwritten or flushed.
///
/// # Concurrent misses
///
/// By default `get_or_compute` is not atomic across callers: two threads
/// missing on the same key may both run their loaders and both store, and
/// the last write wins. Enable [`CacheConfig::single_flight`] to have one
/// loader per key run at a time, with waiters reusing its result.
///
/// With `single_flight` on, a loader must not call `get_or_compute` for the
/// key it is loading: the nested call waits on the outer call's claim and
/// never returns. Loading other keys from inside a loader is fine.
#[derive(Debug)]
pub struct Cache<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Performance statistics
    stats: StatsRecorder,
    /// Keys with a loader currently running (single-flight mode only)
    in_flight: InFlight,
    config: CacheConfig,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty cache with the given configuration.
    ///
    /// # Arguments
    /// * `config` - Log name and single-flight setting for this cache
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsRecorder::default(),
            in_flight: InFlight::default(),
            config,
        }
    }

    // == Set ==
    /// Stores a value under `key`, replacing any previous entry.
    ///
    /// The entry expires `duration` from now; `Duration::ZERO` means it
    /// never expires.
    ///
    /// # Arguments
    /// * `key` - The key to store under (the empty string is allowed)
    /// * `value` - The value to store
    /// * `duration` - Time until expiry, or `NO_EXPIRATION`
    pub fn set(&self, key: impl Into<String>, value: V, duration: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, duration);
        trace!(cache = %self.config.name, key = %key, ?duration, "storing entry");

        self.entries.write().insert(key, entry);
    }

    // == Lookup ==
    /// Returns a copy of the value stored under `key`.
    ///
    /// Returns None if the key is absent or its entry has expired. Expired
    /// entries are left in place.
    pub fn lookup(&self, key: &str) -> Option<V> {
        let found = self.probe(key);
        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    // == Get Or Compute ==
    /// Copies the cached value for `key` into `dest`, or loads it on a miss.
    ///
    /// On a hit, `dest` is overwritten with a copy of the stored value and
    /// `loader` is not called. On a miss (absent or expired), `loader`
    /// populates `dest`:
    /// - if it fails, its error is returned as-is and nothing is stored;
    /// - if it succeeds, a copy of `dest` is stored with the given
    ///   `duration` unless the value [`is_vacant`](Cacheable::is_vacant).
    ///
    /// # Arguments
    /// * `key` - The key to read or populate
    /// * `dest` - Destination overwritten with the cached or loaded value
    /// * `duration` - Expiry applied when a loaded value is stored
    /// * `loader` - Fills `dest` on a miss; its error is returned unchanged
    pub fn get_or_compute<F, E>(
        &self,
        key: &str,
        dest: &mut V,
        duration: Duration,
        loader: F,
    ) -> std::result::Result<(), E>
    where
        V: Cacheable,
        F: FnOnce(&mut V) -> std::result::Result<(), E>,
    {
        self.read_through(
            key,
            dest,
            duration,
            loader,
            |value, dest| {
                *dest = value;
                Ok(())
            },
            |dest| (!dest.is_vacant()).then(|| dest.clone()),
        )
    }

    // == Flush ==
    /// Discards every entry.
    pub fn flush(&self) {
        let discarded = std::mem::take(&mut *self.entries.write());
        debug!(
            cache = %self.config.name,
            discarded = discarded.len(),
            "cache flushed"
        );
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones that
    /// have not been overwritten or flushed yet.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Reads a live entry without touching the statistics.
    pub(crate) fn probe(&self, key: &str) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Shared read-through path.
    ///
    /// `fill` copies a stored value into the destination on a hit. `capture`
    /// turns a freshly loaded destination into the value to store, or None
    /// to skip storing it.
    pub(crate) fn read_through<T, F, E, Fill, Capture>(
        &self,
        key: &str,
        dest: &mut T,
        duration: Duration,
        loader: F,
        fill: Fill,
        capture: Capture,
    ) -> std::result::Result<(), E>
    where
        F: FnOnce(&mut T) -> std::result::Result<(), E>,
        Fill: FnOnce(V, &mut T) -> std::result::Result<(), E>,
        Capture: FnOnce(&T) -> Option<V>,
    {
        if let Some(value) = self.probe(key) {
            self.stats.record_hit();
            trace!(cache = %self.config.name, key, "cache hit");
            return fill(value, dest);
        }

        let _flight = if self.config.single_flight {
            let guard = self.in_flight.acquire(key);
            // Another caller may have stored the value while we waited
            if let Some(value) = self.probe(key) {
                self.stats.record_hit();
                trace!(cache = %self.config.name, key, "cache hit after in-flight load");
                return fill(value, dest);
            }
            Some(guard)
        } else {
            None
        };

        self.stats.record_miss();
        self.stats.record_load();
        trace!(cache = %self.config.name, key, "cache miss, running loader");

        if let Err(err) = loader(dest) {
            self.stats.record_load_failure();
            debug!(cache = %self.config.name, key, "loader failed, nothing stored");
            return Err(err);
        }

        match capture(dest) {
            Some(value) => self.set(key, value, duration),
            None => {
                self.stats.record_skipped_store();
                debug!(cache = %self.config.name, key, "loader produced an empty sequence, not stored");
            }
        }

        Ok(())
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread::{self, sleep};

    #[test]
    fn test_cache_new() {
        let cache: Cache<String> = Cache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.config(), &CacheConfig::default());
    }

    #[test]
    fn test_cache_set_and_lookup() {
        let cache = Cache::new();

        cache.set("key1", "value1".to_string(), Duration::ZERO);

        assert_eq!(cache.lookup("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_lookup_nonexistent() {
        let cache: Cache<String> = Cache::new();
        assert_eq!(cache.lookup("nonexistent"), None);
    }

    #[test]
    fn test_cache_empty_key_is_legal() {
        let cache = Cache::new();

        cache.set("", 7u32, Duration::ZERO);
        assert_eq!(cache.lookup(""), Some(7));
    }

    #[test]
    fn test_cache_overwrite() {
        let cache = Cache::new();

        cache.set("key1", "value1".to_string(), Duration::ZERO);
        cache.set("key1", "value2".to_string(), Duration::ZERO);

        assert_eq!(cache.lookup("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_resets_expiration() {
        let cache = Cache::new();

        cache.set("key1", 1u32, Duration::from_millis(20));
        cache.set("key1", 2u32, Duration::ZERO);
        sleep(Duration::from_millis(25));

        assert_eq!(cache.lookup("key1"), Some(2));
    }

    #[test]
    fn test_expired_entry_is_not_evicted() {
        let cache = Cache::new();

        cache.set("key1", "value1".to_string(), Duration::from_millis(20));
        sleep(Duration::from_millis(25));

        assert_eq!(cache.lookup("key1"), None);
        // Lazy expiration: the stale entry still occupies storage
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_flush_clears_entries() {
        let cache = Cache::new();
        cache.set("a", 1u8, Duration::ZERO);
        cache.set("b", 2u8, Duration::from_secs(60));

        cache.flush();

        assert!(cache.is_empty());
        assert_eq!(cache.lookup("a"), None);
        assert_eq!(cache.lookup("b"), None);
    }

    #[test]
    fn test_lookup_returns_independent_copy() {
        let cache = Cache::new();
        cache.set("list", vec![1, 2, 3], Duration::ZERO);

        let mut copy = cache.lookup("list").unwrap();
        copy.push(4);

        assert_eq!(cache.lookup("list"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_get_or_compute_skips_vacant_result() {
        let cache: Cache<Vec<u32>> = Cache::new();
        let mut dest = Vec::new();

        cache
            .get_or_compute("empty", &mut dest, Duration::ZERO, |_| Ok::<_, ()>(()))
            .unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().skipped_stores, 1);
    }

    #[test]
    fn test_stats_track_get_or_compute() {
        let cache: Cache<u32> = Cache::new();
        let mut dest = 0;

        cache
            .get_or_compute("n", &mut dest, Duration::ZERO, |d| {
                *d = 5;
                Ok::<_, ()>(())
            })
            .unwrap();
        cache
            .get_or_compute("n", &mut dest, Duration::ZERO, |_| Ok::<_, ()>(()))
            .unwrap();
        let _ = cache.get_or_compute("broken", &mut dest, Duration::ZERO, |_| Err("boom"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.loads, 2);
        assert_eq!(stats.load_failures, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_readers_do_not_block_each_other() {
        let cache = Arc::new(Cache::new());
        cache.set("key1", "value1".to_string(), Duration::ZERO);

        // Hold the shared lock while another thread reads
        let held = cache.entries.read();

        let (tx, rx) = mpsc::channel();
        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                tx.send(cache.lookup("key1")).unwrap();
            })
        };

        let value = rx.recv_timeout(Duration::from_secs(5));
        drop(held);
        reader.join().unwrap();

        assert_eq!(value, Ok(Some("value1".to_string())));
    }

    #[test]
    fn test_writer_excludes_readers() {
        let cache = Arc::new(Cache::new());
        cache.set("key1", 1u32, Duration::ZERO);

        let held = cache.entries.write();

        let (tx, rx) = mpsc::channel();
        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                tx.send(cache.lookup("key1")).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        drop(held);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Some(1)));
        reader.join().unwrap();
    }

    #[test]
    fn test_single_flight_loader_may_load_other_keys() {
        let cache: Cache<u32> = Cache::with_config(CacheConfig::default().with_single_flight(true));
        let mut outer = 0;

        cache
            .get_or_compute("outer", &mut outer, Duration::ZERO, |dest| {
                let mut inner = 0;
                cache.get_or_compute("inner", &mut inner, Duration::ZERO, |d| {
                    *d = 2;
                    Ok::<_, ()>(())
                })?;
                *dest = inner + 1;
                Ok::<_, ()>(())
            })
            .unwrap();

        assert_eq!(outer, 3);
        assert_eq!(cache.lookup("inner"), Some(2));
        assert_eq!(cache.lookup("outer"), Some(3));
    }
}
