//! In-memory response caches.
//!
//! Entries live for the process lifetime and are only ever replaced. The
//! lock guards a map lookup or insert and is released before any upstream
//! call, so concurrent misses may both fetch; the last write wins.

pub mod snapshot;

pub use snapshot::{CongressSnapshot, SnapshotCell};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Keyed cache with a per-lookup time-to-live.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, (Instant, V)>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clone of the value under `key` if it was stored less than `ttl` ago.
    pub fn get_fresh(&self, key: &K, ttl: Duration) -> Option<V> {
        let entries = self.lock();
        let (stored_at, value) = entries.get(key)?;
        (stored_at.elapsed() < ttl).then(|| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        assert!(cache.is_empty());

        cache.insert("member-stats:A000001".to_string(), 7);
        assert_eq!(
            cache.get_fresh(&"member-stats:A000001".to_string(), Duration::from_secs(60)),
            Some(7)
        );
        assert_eq!(cache.get_fresh(&"other".to_string(), Duration::from_secs(60)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entry_is_ignored_but_kept() {
        let cache: TtlCache<&str, u32> = TtlCache::new();
        cache.insert("k", 1);
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.get_fresh(&"k", Duration::from_millis(1)), None);
        assert_eq!(cache.get_fresh(&"k", Duration::from_secs(60)), Some(1));
    }

    #[test]
    fn test_insert_replaces() {
        let cache: TtlCache<&str, u32> = TtlCache::new();
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get_fresh(&"k", Duration::from_secs(1)), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
