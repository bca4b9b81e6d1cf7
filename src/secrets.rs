//! Namespaced one-time secret storage
//!
//! A [`SecretStore`] hands out freshly generated secrets and keeps only their
//! hashes, under keys of the form `PREFIX + namespace + "_" + key`, in an
//! [`ExpiringKeyValueStore`]. Every failure is folded into the return value:
//! `false` for writes and deletes, `None` for reads and empty strings when
//! generation degrades.

use std::fmt;
use std::sync::Arc;

use crate::crypto::Argon2Generator;
use crate::error::Result;
use crate::metrics::increment_counter;
use crate::policy::SecretPolicy;
use crate::store::ExpiringKeyValueStore;
use crate::timer;
use crate::util::Clock;
use crate::SecretGenerator;

/// Prefix shared by every key any SecretStore writes
pub const PREFIX: &str = "secrets_manager_";

/// Builder for [`SecretStore`]
pub struct SecretStoreBuilder {
    namespace: String,
    policy: SecretPolicy,
    store: Option<Arc<dyn ExpiringKeyValueStore>>,
    generator: Option<Arc<dyn SecretGenerator>>,
    use_default_generator: bool,
    clock: Option<Arc<dyn Clock>>,
}

impl fmt::Debug for SecretStoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStoreBuilder")
            .field("namespace", &self.namespace)
            .field("policy", &self.policy)
            .field("has_store", &self.store.is_some())
            .field("has_generator", &(self.generator.is_some() || self.use_default_generator))
            .finish()
    }
}

impl SecretStoreBuilder {
    fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            policy: SecretPolicy::default(),
            store: None,
            generator: None,
            use_default_generator: true,
            clock: None,
        }
    }

    /// Sets the store hashes are written to
    pub fn with_store(mut self, store: Arc<dyn ExpiringKeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the expiration and generation policy
    pub fn with_policy(mut self, policy: SecretPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the secret generator
    pub fn with_generator(mut self, generator: Arc<dyn SecretGenerator>) -> Self {
        self.generator = Some(generator);
        self.use_default_generator = false;
        self
    }

    /// Builds a store with no generator; [`SecretStore::generate`] then yields empty strings
    pub fn without_generator(mut self) -> Self {
        self.generator = None;
        self.use_default_generator = false;
        self
    }

    /// Overrides the clock used to judge expiry in [`SecretStore::flush_expired`]
    ///
    /// Without one, the store's own [`ExpiringKeyValueStore::now`] is used.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the policy and builds the store
    pub fn build(self) -> Result<SecretStore> {
        self.policy.validate()?;

        let generator = match self.generator {
            Some(generator) => Some(generator),
            None if self.use_default_generator => {
                let generator: Arc<dyn SecretGenerator> =
                    Arc::new(Argon2Generator::from_policy(&self.policy));
                Some(generator)
            }
            None => None,
        };

        Ok(SecretStore {
            namespace: self.namespace,
            expiration: self.policy.expiration.as_secs(),
            secret_length: self.policy.secret_length,
            store: self.store,
            generator,
            clock: self.clock,
        })
    }
}

/// Namespaced, expiring storage for secret hashes
pub struct SecretStore {
    namespace: String,
    expiration: u64,
    secret_length: usize,
    store: Option<Arc<dyn ExpiringKeyValueStore>>,
    generator: Option<Arc<dyn SecretGenerator>>,
    clock: Option<Arc<dyn Clock>>,
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("namespace", &self.namespace)
            .field("expiration", &self.expiration)
            .field("secret_length", &self.secret_length)
            .field("store", &self.store)
            .field("generator", &self.generator)
            .finish()
    }
}

impl SecretStore {
    /// Creates a store with the default policy and Argon2id generator
    ///
    /// # Example
    /// ```
    /// use secretsmanager::secrets::SecretStore;
    /// use secretsmanager::store::MemoryStore;
    /// use std::sync::Arc;
    ///
    /// let secrets = SecretStore::new("login", Arc::new(MemoryStore::new()));
    /// assert_eq!(secrets.key("user42"), "secrets_manager_login_user42");
    /// assert_eq!(secrets.expiration(), 1200);
    /// ```
    pub fn new(namespace: impl Into<String>, store: Arc<dyn ExpiringKeyValueStore>) -> Self {
        Self {
            namespace: namespace.into(),
            expiration: SecretPolicy::default().expiration.as_secs(),
            secret_length: SecretPolicy::default().secret_length,
            store: Some(store),
            generator: Some(Arc::new(Argon2Generator::new())),
            clock: None,
        }
    }

    /// Starts building a store for `namespace`
    pub fn builder(namespace: impl Into<String>) -> SecretStoreBuilder {
        SecretStoreBuilder::new(namespace)
    }

    /// The namespace fixed at construction
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Seconds a stored hash lives
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    /// Changes the TTL applied to subsequent writes
    pub fn set_expiration(&mut self, seconds: u64) {
        self.expiration = seconds;
    }

    /// Length of the secrets [`generate`](Self::generate) produces
    pub fn secret_length(&self) -> usize {
        self.secret_length
    }

    /// The common prefix of every key this namespace owns
    pub fn prefix(&self) -> String {
        format!("{}{}_", PREFIX, self.namespace)
    }

    /// The store key for `key`
    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    /// Generates a fresh secret and its hash
    ///
    /// Returns a pair of empty strings when no generator is configured or the
    /// generator fails.
    pub fn generate(&self) -> (String, String) {
        let _timer = timer!("secrets.generate");

        let Some(generator) = self.generator.as_ref() else {
            log::warn!("no secret generator configured for namespace {}", self.namespace);
            increment_counter("secrets.generate.degraded", 1);
            return (String::new(), String::new());
        };

        let pair = generator
            .generate_secret(self.secret_length)
            .and_then(|secret| generator.hash_secret(&secret).map(|hash| (secret, hash)));

        match pair {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("secret generation degraded for namespace {}: {}", self.namespace, e);
                increment_counter("secrets.generate.degraded", 1);
                (String::new(), String::new())
            }
        }
    }

    /// Generates a secret, stores its hash under `key` and returns the plaintext
    ///
    /// The plaintext is never stored; delivering it is up to the caller.
    pub fn init(&self, key: &str) -> (bool, String) {
        let (secret, hash) = self.generate();
        let is_set = self.set(key, &hash);
        (is_set, secret)
    }

    /// Stores `hash` under `key` with the current expiration
    pub fn set(&self, key: &str, hash: &str) -> bool {
        let _timer = timer!("secrets.store.set");
        let Some(store) = self.store_or_warn("set") else {
            return false;
        };

        let full_key = self.key(key);
        match store.set_durable(&full_key, hash, self.expiration) {
            Ok(stored) => {
                log::debug!("set {} (ttl {}s): {}", full_key, self.expiration, stored);
                stored
            }
            Err(e) => {
                log::warn!("failed to set {}: {}", full_key, e);
                false
            }
        }
    }

    /// The hash stored under `key`, or `None` when absent or expired
    pub fn get(&self, key: &str) -> Option<String> {
        let _timer = timer!("secrets.store.get");
        let store = self.store_or_warn("get")?;

        let full_key = self.key(key);
        match store.get_durable(&full_key) {
            Ok(Some(hash)) => Some(hash),
            Ok(None) => {
                log::debug!("get {}: not found", full_key);
                increment_counter("secrets.get.miss", 1);
                None
            }
            Err(e) => {
                log::warn!("failed to get {}: {}", full_key, e);
                None
            }
        }
    }

    /// Removes the entry under `key`, returning whether one was deleted
    pub fn delete(&self, key: &str) -> bool {
        let _timer = timer!("secrets.store.delete");
        let Some(store) = self.store_or_warn("delete") else {
            return false;
        };

        let full_key = self.key(key);
        match store.delete_durable(&full_key) {
            Ok(deleted) => {
                log::debug!("delete {}: {}", full_key, deleted);
                deleted
            }
            Err(e) => {
                log::warn!("failed to delete {}: {}", full_key, e);
                false
            }
        }
    }

    /// Checks `plaintext` against the hash stored under `key`
    pub fn verify(&self, key: &str, plaintext: &str) -> bool {
        let Some(generator) = self.generator.as_ref() else {
            return false;
        };

        match self.get(key) {
            Some(hash) if !hash.is_empty() => generator.verify_secret(plaintext, &hash),
            _ => false,
        }
    }

    /// Deletes every entry in this namespace
    ///
    /// Returns whether the bulk delete ran, not whether it found anything.
    pub fn flush(&self) -> bool {
        let _timer = timer!("secrets.store.flush");
        let Some(store) = self.store_or_warn("flush") else {
            return false;
        };

        let prefix = self.prefix();
        match store.bulk_delete_by_prefix(&prefix) {
            Ok(rows) => {
                log::debug!("flushed {} rows under {}", rows, prefix);
                true
            }
            Err(e) => {
                log::warn!("failed to flush {}: {}", prefix, e);
                false
            }
        }
    }

    /// Deletes expired entries in this namespace that the store left behind
    ///
    /// A no-op returning `false` when the store has a cache layer.
    pub fn flush_expired(&self) -> bool {
        let _timer = timer!("secrets.store.flush_expired");
        let Some(store) = self.store_or_warn("flush_expired") else {
            return false;
        };

        if store.is_cache_backed() {
            log::debug!("skipping expired sweep for {}: store is cache backed", self.namespace);
            return false;
        }

        let now = match self.clock.as_ref() {
            Some(clock) => clock.now(),
            None => store.now(),
        };

        let prefix = self.prefix();
        match store.bulk_delete_expired_by_prefix(&prefix, now) {
            Ok(rows) => {
                log::debug!("flushed {} expired rows under {}", rows, prefix);
                true
            }
            Err(e) => {
                log::warn!("failed to flush expired {}: {}", prefix, e);
                false
            }
        }
    }

    fn store_or_warn(&self, op: &str) -> Option<&Arc<dyn ExpiringKeyValueStore>> {
        if self.store.is_none() {
            log::warn!("{} on namespace {}: no store configured", op, self.namespace);
        }
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::MemoryStore;

    #[derive(Debug)]
    struct FailingGenerator;

    impl SecretGenerator for FailingGenerator {
        fn generate_secret(&self, _length: usize) -> Result<String> {
            Err(Error::Generation("no entropy".to_string()))
        }

        fn hash_secret(&self, _plaintext: &str) -> Result<String> {
            Err(Error::Generation("no hasher".to_string()))
        }

        fn verify_secret(&self, _plaintext: &str, _hash: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_key_and_prefix() {
        let secrets = SecretStore::new("login", Arc::new(MemoryStore::new()));

        assert_eq!(secrets.namespace(), "login");
        assert_eq!(secrets.prefix(), "secrets_manager_login_");
        assert_eq!(secrets.key("user42"), "secrets_manager_login_user42");
        assert_eq!(secrets.key(""), secrets.prefix());
        assert_eq!(secrets.key("user42"), secrets.key("user42"));
    }

    #[test]
    fn test_set_expiration() {
        let mut secrets = SecretStore::new("login", Arc::new(MemoryStore::new()));
        assert_eq!(secrets.expiration(), 1200);

        secrets.set_expiration(60);
        assert_eq!(secrets.expiration(), 60);
    }

    #[test]
    fn test_generate_degrades_without_generator() {
        let secrets = SecretStore::builder("login")
            .with_store(Arc::new(MemoryStore::new()))
            .without_generator()
            .build()
            .unwrap();

        assert_eq!(secrets.generate(), (String::new(), String::new()));
    }

    #[test]
    fn test_init_passes_degraded_hash_through() {
        let secrets = SecretStore::builder("login")
            .with_store(Arc::new(MemoryStore::new()))
            .with_generator(Arc::new(FailingGenerator))
            .build()
            .unwrap();

        let (ok, secret) = secrets.init("user42");
        assert!(ok);
        assert_eq!(secret, "");
        assert_eq!(secrets.get("user42"), Some(String::new()));
        assert!(!secrets.verify("user42", ""));
    }

    #[test]
    fn test_missing_store_reports_false() {
        let secrets = SecretStore::builder("login").without_generator().build().unwrap();

        assert!(!secrets.set("user42", "hash"));
        assert_eq!(secrets.get("user42"), None);
        assert!(!secrets.delete("user42"));
        assert!(!secrets.flush());
        assert!(!secrets.flush_expired());

        let (ok, _) = secrets.init("user42");
        assert!(!ok);
    }

    #[test]
    fn test_builder_rejects_invalid_policy() {
        let err = SecretStore::builder("login")
            .with_policy(SecretPolicy::new().with_secret_length(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_applies_policy() {
        let secrets = SecretStore::builder("login")
            .with_store(Arc::new(MemoryStore::new()))
            .with_policy(
                SecretPolicy::new()
                    .with_expiration(std::time::Duration::from_secs(90))
                    .with_secret_length(12),
            )
            .build()
            .unwrap();

        assert_eq!(secrets.expiration(), 90);
        assert_eq!(secrets.secret_length(), 12);
    }

    #[test]
    fn test_builder_defaults_to_policy_generator() {
        let secrets = SecretStore::builder("login")
            .with_store(Arc::new(MemoryStore::new()))
            .with_policy(SecretPolicy::new().with_secret_length(12))
            .build()
            .unwrap();

        let (secret, hash) = secrets.generate();
        assert_eq!(secret.chars().count(), 12);
        assert!(hash.starts_with("$argon2id$"));
    }
}
