//! The store-side seam: executing and loading Lua scripts.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

/// Failure reported by a [`ScriptStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store does not know the script hash (e.g. after a restart or
    /// `SCRIPT FLUSH`). The script must be loaded again before it can run.
    #[error("{0}")]
    NoScript(String),

    /// Any other failure: connection loss, protocol errors, bad arguments.
    #[error("{0}")]
    Command(String),
}

impl StoreError {
    /// Returns true for the "script unknown" condition.
    pub fn is_no_script(&self) -> bool {
        matches!(self, StoreError::NoScript(_))
    }
}

/// A key-value store able to run server-side scripts atomically.
///
/// Implementations only translate calls; they do not retry, cache or reload
/// anything. That is the coordinator's job.
///
/// # Example
///
/// ```rust,ignore
/// let reply = store.evalsha(script.sha(), &[key], &["1000".into()]).await?;
/// if reply.is_some() {
///     // the script returned a non-nil value
/// }
/// ```
pub trait ScriptStore: Send + Sync {
    /// Runs the script identified by `sha` with the given keys and arguments.
    ///
    /// Returns `Ok(None)` for a nil reply.
    fn evalsha(
        &self,
        sha: &str,
        keys: &[String],
        args: &[String],
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Uploads `source` to the store's script cache, returning its hash.
    fn script_load(&self, source: &str) -> impl Future<Output = Result<String, StoreError>> + Send;
}

// Lets several coordinators share one store.
impl<T: ScriptStore> ScriptStore for Arc<T> {
    fn evalsha(
        &self,
        sha: &str,
        keys: &[String],
        args: &[String],
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).evalsha(sha, keys, args)
    }

    fn script_load(&self, source: &str) -> impl Future<Output = Result<String, StoreError>> + Send {
        (**self).script_load(source)
    }
}
