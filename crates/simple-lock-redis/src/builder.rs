//! Building a lock coordinator backed by Redis.

use std::sync::Arc;

use fred::prelude::*;
use simple_lock_core::config::LockConfig;
use simple_lock_core::coordinator::LockCoordinator;
use simple_lock_core::error::{LockError, LockResult};
use tracing::debug;

use crate::store::RedisScriptStore;

/// A lock coordinator talking to Redis.
pub type RedisLockCoordinator = LockCoordinator<RedisScriptStore>;

/// Builder for a Redis-backed [`LockCoordinator`].
///
/// # Example
///
/// ```rust,ignore
/// let locks = RedisLockCoordinatorBuilder::new()
///     .url("redis://localhost:6379")
///     .retry_count(5)
///     .key_prefix("jobs:")
///     .build()
///     .await?;
/// ```
pub struct RedisLockCoordinatorBuilder {
    url: Option<String>,
    client: Option<RedisClient>,
    config: LockConfig,
}

impl RedisLockCoordinatorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: None,
            client: None,
            config: LockConfig::default(),
        }
    }

    /// Sets the Redis server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Uses an existing Redis client instead of connecting from a URL.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Replaces the whole lock configuration.
    pub fn config(mut self, config: LockConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of retries after the first attempt.
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.config.retry_count = retry_count;
        self
    }

    /// Sets the fixed retry delay in milliseconds.
    pub fn retry_delay(mut self, retry_delay: u64) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    /// Sets the jitter bound in milliseconds.
    pub fn retry_jitter(mut self, retry_jitter: u64) -> Self {
        self.config.retry_jitter = retry_jitter;
        self
    }

    /// Sets a function computing the retry delay from the retry number.
    pub fn retry_proc(mut self, retry_proc: impl Fn(u32) -> u64 + Send + Sync + 'static) -> Self {
        self.config.retry_proc = Some(Arc::new(retry_proc));
        self
    }

    /// Sets the key namespace.
    pub fn key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.config.key_prefix = key_prefix.into();
        self
    }

    /// Builds the coordinator, connecting to the URL if no client was given.
    ///
    /// # Errors
    ///
    /// * `LockError::InvalidConfig` - Neither a client nor a URL was supplied
    /// * `LockError::Connection` - The URL is invalid or the server is unreachable
    pub async fn build(self) -> LockResult<RedisLockCoordinator> {
        let client = match (self.client, self.url) {
            (Some(client), _) => client,
            (None, Some(url)) => connect_client(&url).await?,
            (None, None) => {
                return Err(LockError::InvalidConfig(
                    "no Redis client or URL provided".to_string(),
                ));
            }
        };

        Ok(LockCoordinator::new(RedisScriptStore::new(client), self.config))
    }
}

impl Default for RedisLockCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects to `url` and returns a coordinator with the default configuration.
pub async fn connect(url: impl Into<String>) -> LockResult<RedisLockCoordinator> {
    RedisLockCoordinatorBuilder::new().url(url).build().await
}

async fn connect_client(url: &str) -> LockResult<RedisClient> {
    let config = RedisConfig::from_url(url).map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid Redis URL: {}", e),
        )))
    })?;

    let client = RedisClient::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await.map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::other(format!(
            "failed to connect to Redis: {}",
            e
        ))))
    })?;

    debug!(%url, "connected to Redis");
    Ok(client)
}
