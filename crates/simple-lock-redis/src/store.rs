//! [`ScriptStore`] over a `fred` Redis client.

use fred::prelude::*;
use simple_lock_core::store::{ScriptStore, StoreError};

/// Runs lock scripts on a single Redis server.
#[derive(Clone)]
pub struct RedisScriptStore {
    client: RedisClient,
}

impl RedisScriptStore {
    /// Wraps a connected client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Returns the wrapped client.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

impl ScriptStore for RedisScriptStore {
    async fn evalsha(
        &self,
        sha: &str,
        keys: &[String],
        args: &[String],
    ) -> Result<Option<String>, StoreError> {
        self.client
            .evalsha::<Option<String>, _, _, _>(sha, keys.to_vec(), args.to_vec())
            .await
            .map_err(to_store_error)
    }

    async fn script_load(&self, source: &str) -> Result<String, StoreError> {
        self.client
            .script_load::<String, _>(source)
            .await
            .map_err(to_store_error)
    }
}

/// Redis answers `EVALSHA` for an unknown hash with a `NOSCRIPT` reply error.
fn to_store_error(e: RedisError) -> StoreError {
    if e.details().contains("NOSCRIPT") {
        StoreError::NoScript(e.details().to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}
