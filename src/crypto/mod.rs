//! Secret generation and hashing for the secretsmanager library

mod argon2id;
pub mod charset;

pub use argon2id::{Argon2Generator, SALT_SIZE};
pub use charset::Charset;
