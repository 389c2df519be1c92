//! Lease lock acquisition and release against a [`ScriptStore`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::RwLock;
use tracing::{debug, field::Empty, instrument, warn, Span};

use crate::backoff::{self, JitterSource, ThreadRngJitter};
use crate::config::LockConfig;
use crate::error::{LockError, LockResult};
use crate::script::{Script, ACQUIRE, RELEASE, SCRIPTS};
use crate::store::ScriptStore;

/// How many times a single script call reloads the scripts after the store
/// reports the hash as unknown.
pub const NO_SCRIPT_MAX_RETRIES: u32 = 1;

/// Coordinates lease locks stored in a shared key-value store.
///
/// Mutual exclusion comes entirely from the store running the acquire script
/// atomically. The coordinator keeps no per-lock state; a successful `lock`
/// only tells the caller that it should `unlock` the same key later. A key
/// that is never unlocked expires after its TTL.
///
/// `unlock` deletes the key without checking who set it. Any caller that
/// knows a key can release it, including a holder whose lease already expired
/// and was taken over by someone else.
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = LockCoordinator::new(store, LockConfig::default());
///
/// if coordinator.lock("report", Duration::from_secs(10)).await? {
///     build_report().await;
///     coordinator.unlock("report").await;
/// }
/// ```
pub struct LockCoordinator<S> {
    store: S,
    config: RwLock<LockConfig>,
    jitter: Box<dyn JitterSource>,
}

impl<S: ScriptStore> LockCoordinator<S> {
    /// Creates a coordinator over `store`.
    pub fn new(store: S, config: LockConfig) -> Self {
        Self {
            store,
            config: RwLock::new(config),
            jitter: Box::new(ThreadRngJitter),
        }
    }

    /// Replaces the source of retry jitter.
    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> LockConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration. In-flight calls keep the settings they
    /// started with.
    pub fn set_config(&self, config: LockConfig) {
        *self.config.write() = config;
    }

    /// Edits the configuration in place.
    pub fn update_config(&self, edit: impl FnOnce(&mut LockConfig)) {
        edit(&mut *self.config.write());
    }

    /// Applies `edit` for the duration of `body`, then restores the previous
    /// configuration, even if `body` panics.
    ///
    /// Overlapping scopes on the same coordinator restore in completion
    /// order; nest them rather than running them concurrently.
    pub async fn with_config<F, Fut, T>(&self, edit: impl FnOnce(&mut LockConfig), body: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let saved = {
            let mut config = self.config.write();
            let saved = config.clone();
            edit(&mut *config);
            saved
        };
        let _restore = RestoreConfig {
            slot: &self.config,
            saved: Some(saved),
        };
        body().await
    }

    /// Delay before the `attempt`-th retry under the current configuration.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        backoff::backoff_for_attempt(&*self.config.read(), attempt, self.jitter.as_ref())
    }

    /// Tries to take the lock on `key` for `ttl`, retrying per the
    /// configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The store granted the lock
    /// * `Ok(false)` - Every attempt found the key held
    /// * `Err(LockError::Script)` - The store failed the script call
    #[instrument(skip(self), fields(lock.key = %key, ttl_ms = saturating_millis(ttl), acquired = Empty, attempts = Empty))]
    pub async fn lock(&self, key: &str, ttl: Duration) -> LockResult<bool> {
        let config = self.config();
        let effective_key = config.namespaced(key);
        self.acquire(&config, effective_key, ttl).await
    }

    /// Takes the lock, runs `body` with the outcome, and releases the lock
    /// afterwards if it was taken.
    ///
    /// `body` runs whether or not the lock was acquired. Its output is
    /// returned unchanged. The release also happens when `body` panics; the
    /// panic then resumes.
    ///
    /// Dropping the returned future before `body` finishes (for example under
    /// `tokio::time::timeout`) skips the release. The key then stays held
    /// until its TTL runs out.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let sent = coordinator
    ///     .lock_with("invoice:42", Duration::from_secs(30), |locked| async move {
    ///         if !locked {
    ///             return Ok(false);
    ///         }
    ///         send_invoice(42).await.map(|_| true)
    ///     })
    ///     .await??;
    /// ```
    #[instrument(skip(self, body), fields(lock.key = %key, ttl_ms = saturating_millis(ttl), acquired = Empty, attempts = Empty))]
    pub async fn lock_with<F, Fut, T>(&self, key: &str, ttl: Duration, body: F) -> LockResult<T>
    where
        F: FnOnce(bool) -> Fut,
        Fut: Future<Output = T>,
    {
        let config = self.config();
        let effective_key = config.namespaced(key);
        let locked = self.acquire(&config, effective_key.clone(), ttl).await?;

        let outcome = AssertUnwindSafe(async move { body(locked).await })
            .catch_unwind()
            .await;

        if locked {
            self.release(effective_key).await;
        }

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Releases `key`. Failures are logged and dropped; the lease then
    /// expires at its TTL.
    #[instrument(skip(self), fields(lock.key = %key))]
    pub async fn unlock(&self, key: &str) {
        let effective_key = self.config.read().namespaced(key);
        self.release(effective_key).await;
    }

    /// Uploads every script to the store's script cache.
    #[instrument(skip(self))]
    pub async fn load_scripts(&self) -> LockResult<()> {
        for script in SCRIPTS.iter() {
            let sha = self
                .store
                .script_load(script.source())
                .await
                .map_err(|e| LockError::Script(e.to_string()))?;
            debug!(script = script.name(), %sha, "loaded script");
        }
        Ok(())
    }

    /// Runs `script` by hash, reloading the scripts once if the store no
    /// longer knows the hash.
    pub async fn exec_script(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> LockResult<Option<String>> {
        let mut retries = 0;
        loop {
            match self.store.evalsha(script.sha(), keys, args).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_no_script() && retries < NO_SCRIPT_MAX_RETRIES => {
                    retries += 1;
                    warn!(script = script.name(), error = %e, "script unknown to store, reloading");
                    self.load_scripts().await?;
                }
                Err(e) => return Err(LockError::Script(e.to_string())),
            }
        }
    }

    async fn acquire(&self, config: &LockConfig, effective_key: String, ttl: Duration) -> LockResult<bool> {
        let keys = [effective_key];
        let args = [ttl.as_millis().to_string()];

        for attempt in 0..=config.retry_count {
            if attempt > 0 {
                let delay = backoff::backoff_for_attempt(config, attempt, self.jitter.as_ref());
                debug!(attempt, delay_ms = saturating_millis(delay), "lock is held, backing off");
                tokio::time::sleep(delay).await;
            }

            if self.exec_script(&ACQUIRE, &keys, &args).await?.is_some() {
                Span::current().record("acquired", true);
                Span::current().record("attempts", attempt + 1);
                return Ok(true);
            }
        }

        Span::current().record("acquired", false);
        Span::current().record("attempts", config.retry_count + 1);
        Ok(false)
    }

    async fn release(&self, effective_key: String) {
        if let Err(e) = self.exec_script(&RELEASE, &[effective_key], &[]).await {
            debug!(error = %e, "release failed, leaving the key to expire");
        }
    }
}

/// Milliseconds in `duration`, clamped to `u64::MAX` for span fields.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

struct RestoreConfig<'a> {
    slot: &'a RwLock<LockConfig>,
    saved: Option<LockConfig>,
}

impl Drop for RestoreConfig<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.slot.write() = saved;
        }
    }
}
