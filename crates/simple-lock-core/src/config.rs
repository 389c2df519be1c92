//! Lock tunables.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Computes the base retry delay in milliseconds for a 1-based retry number.
pub type RetryProc = Arc<dyn Fn(u32) -> u64 + Send + Sync>;

/// Default namespace prepended to every lock key.
pub const DEFAULT_KEY_PREFIX: &str = "simple_lock:";

/// Retry and namespacing settings read by the coordinator at the start of
/// every call.
///
/// # Example
///
/// ```rust
/// use simple_lock_core::LockConfig;
///
/// let config = LockConfig::default()
///     .with_retry_count(5)
///     .with_retry_proc(|attempt| u64::from(attempt) * 150)
///     .with_key_prefix("billing:");
/// assert_eq!(config.retry_count, 5);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Retries after the first attempt, so `retry_count + 1` attempts in total.
    pub retry_count: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub retry_delay: u64,
    /// Exclusive upper bound of the random delay added to each wait, in
    /// milliseconds. Zero disables jitter.
    pub retry_jitter: u64,
    /// Replaces `retry_delay` when set.
    #[serde(skip)]
    pub retry_proc: Option<RetryProc>,
    /// Prepended to every key before it reaches the store.
    pub key_prefix: String,
}

impl LockConfig {
    /// Sets the number of retries.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Sets the fixed retry delay in milliseconds.
    pub fn with_retry_delay(mut self, retry_delay: u64) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sets the jitter bound in milliseconds.
    pub fn with_retry_jitter(mut self, retry_jitter: u64) -> Self {
        self.retry_jitter = retry_jitter;
        self
    }

    /// Sets a custom delay function.
    pub fn with_retry_proc(mut self, retry_proc: impl Fn(u32) -> u64 + Send + Sync + 'static) -> Self {
        self.retry_proc = Some(Arc::new(retry_proc));
        self
    }

    /// Sets the key namespace.
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Returns the key as it is stored: `key_prefix + key`.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: 200,
            retry_jitter: 50,
            retry_proc: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for LockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockConfig")
            .field("retry_count", &self.retry_count)
            .field("retry_delay", &self.retry_delay)
            .field("retry_jitter", &self.retry_jitter)
            .field("retry_proc", &self.retry_proc.as_ref().map(|_| "<fn>"))
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
