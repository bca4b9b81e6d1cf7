use crate::error::{Error, Result};

use super::kv_store::{AccessMode, ExpiringKeyValueStore};
use super::memory::MemoryStore;

use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Default number of entries the object cache holds
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// A [`MemoryStore`] fronted by a volatile, bounded object cache
///
/// Cache-preferring calls only ever touch the cache. The cache does not
/// enforce TTLs and silently drops its least recently used entries once it
/// is full, so anything that must expire on schedule has to use
/// [`AccessMode::Durable`], which goes straight to the durable table.
pub struct CachedStore {
    durable: MemoryStore,
    cache: Mutex<LruCache<String, String>>,
}

impl fmt::Debug for CachedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cached, capacity) = self
            .cache
            .lock()
            .map(|cache| (cache.len(), cache.cap().get()))
            .unwrap_or((0, 0));

        f.debug_struct("CachedStore")
            .field("durable", &self.durable)
            .field("cached", &cached)
            .field("capacity", &capacity)
            .finish()
    }
}

impl CachedStore {
    /// Creates a cached store over `durable` holding at most `capacity` cached entries
    pub fn new(durable: MemoryStore, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Error::InvalidArgument("cache capacity must be non-zero".to_string()))?;

        Ok(Self {
            durable,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Creates a cached store with the default capacity
    pub fn with_default_capacity(durable: MemoryStore) -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            durable,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The durable table behind the cache
    pub fn durable(&self) -> &MemoryStore {
        &self.durable
    }

    /// Number of entries currently in the object cache
    pub fn cached_len(&self) -> Result<usize> {
        Ok(self.cache.lock()?.len())
    }

    fn evict_prefix(&self, prefix: &str) -> Result<usize> {
        let mut cache = self.cache.lock()?;
        let keys: Vec<String> = cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &keys {
            cache.pop(key);
        }
        Ok(keys.len())
    }
}

impl ExpiringKeyValueStore for CachedStore {
    fn set(&self, key: &str, value: &str, ttl_seconds: u64, mode: AccessMode) -> Result<bool> {
        match mode {
            AccessMode::Durable => self.durable.set(key, value, ttl_seconds, mode),
            AccessMode::PreferCache => {
                self.cache.lock()?.put(key.to_string(), value.to_string());
                Ok(true)
            }
        }
    }

    fn get(&self, key: &str, mode: AccessMode) -> Result<Option<String>> {
        match mode {
            AccessMode::Durable => self.durable.get(key, mode),
            AccessMode::PreferCache => Ok(self.cache.lock()?.get(key).cloned()),
        }
    }

    fn delete(&self, key: &str, mode: AccessMode) -> Result<bool> {
        match mode {
            AccessMode::Durable => self.durable.delete(key, mode),
            AccessMode::PreferCache => Ok(self.cache.lock()?.pop(key).is_some()),
        }
    }

    fn bulk_delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let rows = self.durable.bulk_delete_by_prefix(prefix)?;
        let cached = self.evict_prefix(prefix)?;
        Ok(rows + cached)
    }

    fn bulk_delete_expired_by_prefix(&self, prefix: &str, now_epoch: i64) -> Result<usize> {
        self.durable.bulk_delete_expired_by_prefix(prefix, now_epoch)
    }

    fn is_cache_backed(&self) -> bool {
        true
    }

    fn now(&self) -> i64 {
        self.durable.now()
    }
}
