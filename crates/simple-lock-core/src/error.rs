//! Error types for lock operations.

use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Failing to acquire a lock is not an error: `lock` reports it as `Ok(false)`.
#[derive(Error, Debug)]
pub enum LockError {
    /// The store rejected a script call, or a script stayed unknown to the
    /// store after it was reloaded.
    #[error("script error: {0}")]
    Script(String),

    /// Connecting to the backing store failed.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The coordinator could not be built from the given settings.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
