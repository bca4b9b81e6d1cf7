use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::charset::Charset;
use crate::error::{Error, Result};
use crate::policy::SecretPolicy;
use crate::util::get_rand_bytes;
use crate::SecretGenerator;

/// Size of the random salt mixed into each hash
pub const SALT_SIZE: usize = 16;

/// Secret generator producing Argon2id PHC hashes
#[derive(Debug, Clone)]
pub struct Argon2Generator {
    charset: Charset,
    params: Params,
}

impl Default for Argon2Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Argon2Generator {
    /// Creates a generator with the default alphabet and Argon2 parameters
    pub fn new() -> Self {
        Self {
            charset: Charset::default(),
            params: Params::default(),
        }
    }

    /// Creates a generator whose alphabet follows the given policy
    pub fn from_policy(policy: &SecretPolicy) -> Self {
        Self {
            charset: Charset::new(policy.special_chars, policy.extra_special_chars),
            params: Params::default(),
        }
    }

    /// Overrides the Argon2 cost parameters
    ///
    /// `m_cost` is in KiB. Lower costs make hashing cheaper for tests and
    /// benchmarks; production callers should keep the defaults.
    pub fn with_params(mut self, m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        self.params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| Error::InvalidArgument(format!("invalid argon2 params: {}", e)))?;
        Ok(self)
    }

    /// The alphabet secrets are drawn from
    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl SecretGenerator for Argon2Generator {
    fn generate_secret(&self, length: usize) -> Result<String> {
        self.charset.sample(length)
    }

    fn hash_secret(&self, plaintext: &str) -> Result<String> {
        let salt_bytes = Zeroizing::new(get_rand_bytes(SALT_SIZE)?);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::Generation(format!("salt encoding failed: {}", e)))?;

        let hash = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Generation(format!("hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify_secret(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .hasher()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::debug!("unparsable password hash: {}", e);
                false
            }
        }
    }
}
