use thiserror::Error;

/// Result type for secretsmanager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the secretsmanager library
#[derive(Error, Debug)]
pub enum Error {
    /// The entropy source or the hash function could not produce output
    #[error("Generation error: {0}")]
    Generation(String),

    /// The backing store cannot be reached or its state is unusable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid or unparsable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Errors related to JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::StoreUnavailable(format!("lock poisoned: {}", err))
    }
}
