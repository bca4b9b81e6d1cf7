use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default values for SecretPolicy
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(20 * 60); // 20 minutes
pub const DEFAULT_SECRET_LENGTH: usize = 32;

/// Policy for secret generation and retention
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecretPolicy {
    /// How long a stored hash stays valid. Zero means it never expires.
    #[serde(rename = "expiration_secs", deserialize_with = "duration_secs::deserialize")]
    pub expiration: Duration,

    /// Number of characters in a generated secret
    pub secret_length: usize,

    /// Whether to include `!@#$%^&*()` in generated secrets
    pub special_chars: bool,

    /// Whether to include the extended punctuation set in generated secrets
    pub extra_special_chars: bool,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            expiration: DEFAULT_EXPIRATION,
            secret_length: DEFAULT_SECRET_LENGTH,
            special_chars: true,
            extra_special_chars: false,
        }
    }
}

impl SecretPolicy {
    /// Creates a new SecretPolicy with the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a policy from a JSON document. Missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use secretsmanager::policy::SecretPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = SecretPolicy::from_json(r#"{"expiration_secs": 60}"#).unwrap();
    /// assert_eq!(policy.expiration, Duration::from_secs(60));
    /// assert_eq!(policy.secret_length, 32);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Sets the expiration applied to stored hashes
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets the generated secret length
    pub fn with_secret_length(mut self, length: usize) -> Self {
        self.secret_length = length;
        self
    }

    /// Enables or disables the basic special character set
    pub fn with_special_chars(mut self, enabled: bool) -> Self {
        self.special_chars = enabled;
        self
    }

    /// Enables or disables the extended special character set
    pub fn with_extra_special_chars(mut self, enabled: bool) -> Self {
        self.extra_special_chars = enabled;
        self
    }

    /// Checks the policy for values no secret can be generated from
    pub fn validate(&self) -> Result<()> {
        if self.secret_length == 0 {
            return Err(Error::Config("secret_length must be greater than zero".to_string()));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = SecretPolicy::new();
        assert_eq!(policy.expiration, Duration::from_secs(1200));
        assert_eq!(policy.secret_length, 32);
        assert!(policy.special_chars);
        assert!(!policy.extra_special_chars);
    }

    #[test]
    fn test_builder_methods() {
        let policy = SecretPolicy::new()
            .with_expiration(Duration::from_secs(60))
            .with_secret_length(48)
            .with_special_chars(false)
            .with_extra_special_chars(true);

        assert_eq!(policy.expiration, Duration::from_secs(60));
        assert_eq!(policy.secret_length, 48);
        assert!(!policy.special_chars);
        assert!(policy.extra_special_chars);
    }

    #[test]
    fn test_from_json() {
        let policy = SecretPolicy::from_json(
            r#"{"expiration_secs": 300, "secret_length": 20, "special_chars": false}"#,
        )
        .unwrap();

        assert_eq!(policy.expiration, Duration::from_secs(300));
        assert_eq!(policy.secret_length, 20);
        assert!(!policy.special_chars);
        assert!(!policy.extra_special_chars);

        let empty = SecretPolicy::from_json("{}").unwrap();
        assert_eq!(empty, SecretPolicy::default());
    }

    #[test]
    fn test_from_json_rejects_zero_length() {
        let err = SecretPolicy::from_json(r#"{"secret_length": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = SecretPolicy::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
