use crate::error::Result;
use crate::util::{Clock, SystemClock};
use std::fmt::Debug;

/// Which persistence path a store call should take.
///
/// Stores that front a durable table with a volatile object cache can absorb
/// writes in the cache, where TTLs are not guaranteed to be enforced. Callers
/// that depend on expiry pass [`AccessMode::Durable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Let the store serve the call from its cache layer when it has one
    PreferCache,
    /// Bypass any cache layer and hit the durable storage
    Durable,
}

/// A string key/value store whose entries expire.
///
/// Implementors own their locking and consistency; every method may be
/// called concurrently from multiple threads.
pub trait ExpiringKeyValueStore: Send + Sync + Debug {
    /// Stores a value with a time-to-live
    ///
    /// # Arguments
    /// * `key` - The key to store the value under
    /// * `value` - The value to store
    /// * `ttl_seconds` - Seconds until the entry expires; zero never expires
    /// * `mode` - Which persistence path to use
    ///
    /// # Returns
    /// * `Ok(true)` - If the store accepted the write
    /// * `Ok(false)` - If the store declined the write
    /// * `Err(e)` - If an error occurred during storage
    fn set(&self, key: &str, value: &str, ttl_seconds: u64, mode: AccessMode) -> Result<bool>;

    /// Gets a value by key
    ///
    /// # Returns
    /// * `Ok(Some(value))` - If the key exists and has not expired
    /// * `Ok(None)` - If the key doesn't exist or has expired
    /// * `Err(e)` - If an error occurred during retrieval
    fn get(&self, key: &str, mode: AccessMode) -> Result<Option<String>>;

    /// Deletes a value by key
    ///
    /// # Returns
    /// * `Ok(true)` - If a value was deleted
    /// * `Ok(false)` - If no value existed for the key
    /// * `Err(e)` - If an error occurred during deletion
    fn delete(&self, key: &str, mode: AccessMode) -> Result<bool>;

    /// Deletes every entry whose key starts with `prefix`, including any
    /// TTL bookkeeping the store keeps for those entries
    ///
    /// Returns the number of stored rows removed.
    fn bulk_delete_by_prefix(&self, prefix: &str) -> Result<usize>;

    /// Deletes entries under `prefix` whose expiry lies before `now_epoch`
    ///
    /// Returns the number of stored rows removed.
    fn bulk_delete_expired_by_prefix(&self, prefix: &str, now_epoch: i64) -> Result<usize>;

    /// Whether a volatile cache layer sits in front of the durable storage
    fn is_cache_backed(&self) -> bool;

    /// The epoch second the store stamps expiries against
    ///
    /// Stores with an injected clock override this so expiry sweeps agree
    /// with the timeouts they recorded.
    fn now(&self) -> i64 {
        SystemClock.now()
    }

    /// Stores a value through the durable path
    fn set_durable(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool> {
        self.set(key, value, ttl_seconds, AccessMode::Durable)
    }

    /// Gets a value through the durable path
    fn get_durable(&self, key: &str) -> Result<Option<String>> {
        self.get(key, AccessMode::Durable)
    }

    /// Deletes a value through the durable path
    fn delete_durable(&self, key: &str) -> Result<bool> {
        self.delete(key, AccessMode::Durable)
    }
}
