//! Result store implementations.

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use lru::LruCache;
use metrics::counter;
use time::OffsetDateTime;

use crate::domain::content::ResultSet;
use crate::util::clock::Clock;
use crate::util::lock::{rw_read, rw_write};

use super::config::CacheConfig;

const SOURCE: &str = "cache::store";

/// Key/value store with per-entry lifetimes.
///
/// Implementations must treat any failure as a miss: callers fall back to
/// querying the content engine.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<ResultSet>;

    fn set(&self, key: &str, value: ResultSet, ttl: Duration);
}

/// Never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledResultCache;

impl ResultCache for DisabledResultCache {
    fn get(&self, _key: &str) -> Option<ResultSet> {
        None
    }

    fn set(&self, _key: &str, _value: ResultSet, _ttl: Duration) {}
}

#[derive(Clone)]
struct Entry {
    value: ResultSet,
    expires_at: OffsetDateTime,
}

/// In-memory LRU store.
///
/// Expired entries are dropped lazily on read.
pub struct MemoryResultCache {
    entries: RwLock<LruCache<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryResultCache {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &str) -> Option<ResultSet> {
        let now = self.clock.now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn set(&self, key: &str, value: ResultSet, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        let evicted = rw_write(&self.entries, SOURCE, "set").push(
            key.to_string(),
            Entry { value, expires_at },
        );
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!("on_this_day_cache_evict_total").increment(1);
        }
    }
}
