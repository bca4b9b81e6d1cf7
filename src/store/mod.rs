//! Expiring key/value store implementations for the secretsmanager library
//!
//! This module defines the [`ExpiringKeyValueStore`] capability and ships two backends:
//!
//! - [`MemoryStore`], a durable table with per-entry timeout rows and no cache layer
//! - [`CachedStore`], the same table fronted by a volatile LRU object cache
//!
//! Other backends (an RDBMS options table, a Redis instance) can be added by
//! implementing the trait.

mod cached;
pub mod kv_store;
mod memory;

pub use cached::{CachedStore, DEFAULT_CACHE_CAPACITY};
pub use kv_store::{AccessMode, ExpiringKeyValueStore};
pub use memory::MemoryStore;
