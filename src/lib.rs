//! # Secrets Manager
//!
//! Namespaced, expiring storage for one-time secrets.
//!
//! `secretsmanager` generates random printable secrets, hands the plaintext back to the
//! caller and keeps only a slow salted hash of it in an [`ExpiringKeyValueStore`]. Every
//! entry lives under `PREFIX + namespace + "_" + key` and expires after the configured
//! TTL (20 minutes by default). Because all keys of a namespace share one prefix, the
//! whole namespace can be flushed, or just its expired leftovers swept, without touching
//! anything else in the store.
//!
//! Reads, writes and deletes always take the store's durable path. A store that fronts
//! its durable table with a volatile object cache would otherwise absorb the entry in a
//! layer that does not promise to honour the TTL.
//!
//! ## Basic Usage
//!
//! ```rust
//! use secretsmanager::secrets::SecretStore;
//! use secretsmanager::store::MemoryStore;
//! use std::sync::Arc;
//!
//! let mut secrets = SecretStore::new("login", Arc::new(MemoryStore::new()));
//! secrets.set_expiration(60);
//!
//! // Deliver `secret` to the user out of band; only its hash is kept.
//! let (stored, secret) = secrets.init("user42");
//! assert!(stored);
//! assert_eq!(secret.len(), 32);
//!
//! assert!(secrets.verify("user42", &secret));
//! assert_ne!(secrets.get("user42").as_deref(), Some(secret.as_str()));
//!
//! assert!(secrets.delete("user42"));
//! assert_eq!(secrets.get("user42"), None);
//! ```
//!
//! ## Custom Wiring
//!
//! ```rust
//! use secretsmanager::crypto::Argon2Generator;
//! use secretsmanager::policy::SecretPolicy;
//! use secretsmanager::secrets::SecretStore;
//! use secretsmanager::store::{CachedStore, MemoryStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> secretsmanager::Result<()> {
//! let policy = SecretPolicy::new()
//!     .with_expiration(Duration::from_secs(300))
//!     .with_special_chars(false);
//!
//! let secrets = SecretStore::builder("password-reset")
//!     .with_store(Arc::new(CachedStore::new(MemoryStore::new(), 512)?))
//!     .with_generator(Arc::new(Argon2Generator::from_policy(&policy)))
//!     .with_policy(policy)
//!     .build()?;
//!
//! // The sweep is skipped for cache-backed stores.
//! assert!(!secrets.flush_expired());
//! assert!(secrets.flush());
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod secrets;
pub mod store;
pub mod util;

// Re-export key types
pub use crate::crypto::Argon2Generator;
pub use crate::error::{Error, Result};
pub use crate::metrics::{disable_metrics, metrics_enabled, set_metrics_provider, MetricsProvider};
pub use crate::policy::SecretPolicy;
pub use crate::secrets::{SecretStore, SecretStoreBuilder, PREFIX};
pub use crate::store::{AccessMode, CachedStore, ExpiringKeyValueStore, MemoryStore};
pub use crate::util::{Clock, ManualClock, SystemClock};

use std::fmt;

/// Secret generation interface: a random source paired with a one-way hash
pub trait SecretGenerator: Send + Sync + fmt::Debug {
    /// Generates a random printable secret of `length` characters
    fn generate_secret(&self, length: usize) -> Result<String>;

    /// Hashes a plaintext secret
    fn hash_secret(&self, plaintext: &str) -> Result<String>;

    /// Checks a plaintext against a hash produced by [`hash_secret`](Self::hash_secret)
    fn verify_secret(&self, plaintext: &str, hash: &str) -> bool;
}
