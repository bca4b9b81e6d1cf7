use crate::error::Result;
use crate::util::{Clock, SystemClock};

use super::kv_store::{AccessMode, ExpiringKeyValueStore};

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Table {
    /// key -> value
    values: BTreeMap<String, String>,
    /// key -> absolute expiry in epoch seconds, only for entries with a TTL
    timeouts: BTreeMap<String, i64>,
}

/// Rows of `map` whose key starts with `prefix`, in key order
fn prefix_range<'a, V>(
    map: &'a BTreeMap<String, V>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a V)> + 'a {
    map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(prefix))
}

impl Table {
    fn keys_with_prefix<V>(map: &BTreeMap<String, V>, prefix: &str) -> Vec<String> {
        prefix_range(map, prefix).map(|(k, _)| k.clone()).collect()
    }

    fn is_expired(&self, key: &str, now: i64) -> bool {
        matches!(self.timeouts.get(key), Some(timeout) if *timeout < now)
    }

    /// Removes the value row and its timeout row, returning how many rows went away
    fn remove(&mut self, key: &str) -> usize {
        usize::from(self.values.remove(key).is_some())
            + usize::from(self.timeouts.remove(key).is_some())
    }
}

/// A durable, process-local expiring store
///
/// Every entry is a value row plus, when it was written with a TTL, a
/// parallel timeout row. Expired rows are not swept in the background: a
/// read of an expired entry removes it and reports it missing, and anything
/// never read again stays until [`ExpiringKeyValueStore::bulk_delete_expired_by_prefix`]
/// clears it. There is no cache layer, so both access modes behave the same.
pub struct MemoryStore {
    table: RwLock<Table>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .table
            .read()
            .map(|table| table.values.len())
            .unwrap_or(0);

        f.debug_struct("MemoryStore")
            .field("rows", &rows)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store that reads the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that reads the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            clock,
        }
    }

    /// Every key that still has a value row, expired or not
    pub fn stored_keys(&self) -> Result<Vec<String>> {
        let table = self.table.read()?;
        Ok(table.values.keys().cloned().collect())
    }

    /// The absolute expiry recorded for `key`, if it has one
    pub fn timeout_of(&self, key: &str) -> Result<Option<i64>> {
        let table = self.table.read()?;
        Ok(table.timeouts.get(key).copied())
    }
}

impl ExpiringKeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &str, ttl_seconds: u64, _mode: AccessMode) -> Result<bool> {
        let now = self.clock.now();
        let mut table = self.table.write()?;

        table.values.insert(key.to_string(), value.to_string());
        if ttl_seconds > 0 {
            let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
            table.timeouts.insert(key.to_string(), now.saturating_add(ttl));
        } else {
            table.timeouts.remove(key);
        }

        Ok(true)
    }

    fn get(&self, key: &str, _mode: AccessMode) -> Result<Option<String>> {
        let now = self.clock.now();

        {
            let table = self.table.read()?;
            if !table.is_expired(key, now) {
                return Ok(table.values.get(key).cloned());
            }
        }

        let mut table = self.table.write()?;
        // Re-check under the write lock; a concurrent set may have refreshed it.
        if table.is_expired(key, now) {
            table.remove(key);
            log::debug!("expired entry {} removed on read", key);
            return Ok(None);
        }
        Ok(table.values.get(key).cloned())
    }

    fn delete(&self, key: &str, _mode: AccessMode) -> Result<bool> {
        let mut table = self.table.write()?;
        let existed = table.values.contains_key(key);
        table.remove(key);
        Ok(existed)
    }

    fn bulk_delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let mut table = self.table.write()?;

        let mut removed = 0;
        for key in Table::keys_with_prefix(&table.values, prefix) {
            removed += usize::from(table.values.remove(&key).is_some());
        }
        for key in Table::keys_with_prefix(&table.timeouts, prefix) {
            removed += usize::from(table.timeouts.remove(&key).is_some());
        }

        Ok(removed)
    }

    fn bulk_delete_expired_by_prefix(&self, prefix: &str, now_epoch: i64) -> Result<usize> {
        let mut table = self.table.write()?;

        let expired: Vec<String> = prefix_range(&table.timeouts, prefix)
            .filter(|(_, timeout)| **timeout < now_epoch)
            .map(|(k, _)| k.clone())
            .collect();

        Ok(expired.iter().map(|key| table.remove(key)).sum())
    }

    fn is_cache_backed(&self) -> bool {
        false
    }

    fn now(&self) -> i64 {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ManualClock;

    fn store_at(now: i64) -> (Arc<ManualClock>, MemoryStore) {
        let clock = Arc::new(ManualClock::new(now));
        let store = MemoryStore::with_clock(clock.clone());
        (clock, store)
    }

    #[test]
    fn test_set_get_delete() {
        let (_, store) = store_at(1_000);

        assert!(store.set_durable("a", "1", 60).unwrap());
        assert_eq!(store.get_durable("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.timeout_of("a").unwrap(), Some(1_060));

        assert!(store.delete_durable("a").unwrap());
        assert!(!store.delete_durable("a").unwrap());
        assert_eq!(store.get_durable("a").unwrap(), None);
        assert_eq!(store.timeout_of("a").unwrap(), None);
    }

    #[test]
    fn test_expired_entry_removed_on_read() {
        let (clock, store) = store_at(1_000);
        store.set_durable("a", "1", 60).unwrap();

        // Expiry is strict: the entry is still valid at exactly its timeout.
        clock.advance(60);
        assert_eq!(store.get_durable("a").unwrap(), Some("1".to_string()));

        clock.advance(1);
        assert_eq!(store.get_durable("a").unwrap(), None);
        assert!(store.stored_keys().unwrap().is_empty());
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let (clock, store) = store_at(1_000);
        store.set_durable("a", "1", 60).unwrap();
        store.set_durable("a", "2", 0).unwrap();

        assert_eq!(store.timeout_of("a").unwrap(), None);
        clock.advance(1_000_000);
        assert_eq!(store.get_durable("a").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_bulk_delete_by_prefix() {
        let (_, store) = store_at(1_000);
        store.set_durable("ns_a_1", "x", 60).unwrap();
        store.set_durable("ns_a_2", "y", 0).unwrap();
        store.set_durable("ns_b_1", "z", 60).unwrap();

        // Two value rows and one timeout row.
        assert_eq!(store.bulk_delete_by_prefix("ns_a_").unwrap(), 3);
        assert_eq!(store.stored_keys().unwrap(), vec!["ns_b_1".to_string()]);
        assert_eq!(store.timeout_of("ns_b_1").unwrap(), Some(1_060));
    }

    #[test]
    fn test_prefix_scan_stops_at_neighbours() {
        let (_, store) = store_at(1_000);
        for key in ["ns_", "ns_a", "ns_a_", "ns_a_x", "ns_a_\u{10FFFF}", "ns_aa_x", "ns_b"] {
            store.set_durable(key, "v", 60).unwrap();
        }

        // Value and timeout rows of the three keys under "ns_a_".
        assert_eq!(store.bulk_delete_by_prefix("ns_a_").unwrap(), 6);
        assert_eq!(
            store.stored_keys().unwrap(),
            vec![
                "ns_".to_string(),
                "ns_a".to_string(),
                "ns_aa_x".to_string(),
                "ns_b".to_string()
            ]
        );
        assert_eq!(store.bulk_delete_by_prefix("zz").unwrap(), 0);
    }

    #[test]
    fn test_bulk_delete_expired_by_prefix() {
        let (clock, store) = store_at(1_000);
        store.set_durable("ns_a_old", "x", 10).unwrap();
        store.set_durable("ns_a_forever", "y", 0).unwrap();
        store.set_durable("ns_b_old", "z", 10).unwrap();
        clock.advance(100);
        store.set_durable("ns_a_new", "w", 10).unwrap();

        let removed = store
            .bulk_delete_expired_by_prefix("ns_a_", clock.now())
            .unwrap();
        assert_eq!(removed, 2);

        let keys = store.stored_keys().unwrap();
        assert_eq!(
            keys,
            vec![
                "ns_a_forever".to_string(),
                "ns_a_new".to_string(),
                "ns_b_old".to_string()
            ]
        );
    }

    #[test]
    fn test_now_reads_injected_clock() {
        let (clock, store) = store_at(1_000);
        assert_eq!(store.now(), 1_000);

        clock.advance(5);
        assert_eq!(store.now(), 1_005);
    }

    #[test]
    fn test_not_cache_backed() {
        assert!(!MemoryStore::new().is_cache_backed());
    }
}
