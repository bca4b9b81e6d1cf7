//! Utility functions for the secretsmanager library

use crate::error::{Error, Result};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use zeroize::Zeroize;

/// Fills a buffer with cryptographically secure random bytes
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Generation(format!("entropy source unavailable: {}", e)))
}

/// Generates a random byte array of the specified size
pub fn get_rand_bytes(size: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0_u8; size];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Securely wipes a byte slice
pub fn mem_clear(bytes: &mut [u8]) {
    bytes.zeroize();
}

/// Source of the current time as seconds since the Unix epoch
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current epoch time in seconds
    fn now(&self) -> i64;
}

/// Wall clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to
///
/// Useful for exercising expiration without sleeping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at the given epoch second
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Moves the clock forward by `seconds`
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute epoch second
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
