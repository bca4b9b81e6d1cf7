use crate::error::{Error, Result};
use crate::util::{fill_random, mem_clear};

const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SPECIAL: &str = "!@#$%^&*()";
const EXTRA_SPECIAL: &str = "-_ []{}<>~`+=,.;:/?|";

/// Printable alphabet a secret is drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<u8>,
}

impl Charset {
    /// Builds the alphabet from the alphanumerics plus the requested punctuation sets
    pub fn new(special_chars: bool, extra_special_chars: bool) -> Self {
        let mut chars = ALPHANUMERIC.as_bytes().to_vec();
        if special_chars {
            chars.extend_from_slice(SPECIAL.as_bytes());
        }
        if extra_special_chars {
            chars.extend_from_slice(EXTRA_SPECIAL.as_bytes());
        }
        Self { chars }
    }

    /// Number of distinct characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; the alphanumerics are always present
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Checks whether `c` belongs to the alphabet
    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.chars.contains(&(c as u8))
    }

    /// Draws `length` characters uniformly from the alphabet
    ///
    /// Random bytes outside the largest multiple of the alphabet size are
    /// discarded so every character is equally likely.
    pub fn sample(&self, length: usize) -> Result<String> {
        if self.chars.is_empty() {
            return Err(Error::Generation("empty character set".to_string()));
        }

        let n = self.chars.len();
        let zone = 256 - (256 % n);
        let mut out = String::with_capacity(length);
        let mut buf = [0_u8; 64];

        while out.len() < length {
            fill_random(&mut buf)?;
            for b in buf.iter().map(|b| usize::from(*b)) {
                if b >= zone {
                    continue;
                }
                out.push(char::from(self.chars[b % n]));
                if out.len() == length {
                    break;
                }
            }
        }

        mem_clear(&mut buf);
        Ok(out)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::new(true, false)
    }
}
