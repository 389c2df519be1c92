//! In-memory script store for testing the coordinator.

#![allow(dead_code)]

use simple_lock_core::script::{ACQUIRE, RELEASE, SCRIPTS};
use simple_lock_core::store::{ScriptStore, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One `EVALSHA` call as the store saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCall {
    pub sha: String,
    pub keys: Vec<String>,
    pub args: Vec<String>,
}

#[derive(Default)]
struct State {
    /// key -> expiry deadline
    keys: HashMap<String, Instant>,
    loaded: HashSet<String>,
    evals: Vec<EvalCall>,
    loads: usize,
    flush_every_call: bool,
    skip_call_log: bool,
    failure: Option<String>,
}

/// Mock store that runs the acquire and release scripts natively.
///
/// Starts with an empty script cache, like a freshly started Redis.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    /// Creates a store whose script cache is empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows every script.
    pub fn preloaded() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            for script in SCRIPTS.iter() {
                state.loaded.insert(script.sha().to_string());
            }
        }
        store
    }

    /// Stops recording `EVALSHA` calls, for long-running loops.
    pub fn without_call_log(self) -> Self {
        self.state.lock().unwrap().skip_call_log = true;
        self
    }

    /// Drops every cached script, like `SCRIPT FLUSH`.
    pub fn flush_scripts(&self) {
        self.state.lock().unwrap().loaded.clear();
    }

    /// Flushes the script cache before every `EVALSHA`.
    pub fn flush_on_every_call(&self) {
        self.state.lock().unwrap().flush_every_call = true;
    }

    /// Makes every command fail with `message`, or succeed again with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        self.state.lock().unwrap().failure = message.map(str::to_string);
    }

    /// Sets `key` directly, as another process would.
    pub fn hold(&self, key: &str, ttl: Duration) {
        self.state
            .lock()
            .unwrap()
            .keys
            .insert(key.to_string(), Instant::now() + ttl);
    }

    /// Returns true if `key` is set and not expired.
    pub fn is_held(&self, key: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .keys
            .get(key)
            .is_some_and(|deadline| *deadline > Instant::now())
    }

    /// Every `EVALSHA` received so far.
    pub fn evals(&self) -> Vec<EvalCall> {
        self.state.lock().unwrap().evals.clone()
    }

    /// `EVALSHA` calls for the acquire script.
    pub fn acquire_calls(&self) -> Vec<EvalCall> {
        self.calls_for(ACQUIRE.sha())
    }

    /// `EVALSHA` calls for the release script.
    pub fn release_calls(&self) -> Vec<EvalCall> {
        self.calls_for(RELEASE.sha())
    }

    /// Number of `SCRIPT LOAD` calls.
    pub fn loads(&self) -> usize {
        self.state.lock().unwrap().loads
    }

    fn calls_for(&self, sha: &str) -> Vec<EvalCall> {
        self.evals().into_iter().filter(|c| c.sha == sha).collect()
    }
}

impl ScriptStore for MockStore {
    async fn evalsha(
        &self,
        sha: &str,
        keys: &[String],
        args: &[String],
    ) -> Result<Option<String>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.skip_call_log {
            state.evals.push(EvalCall {
                sha: sha.to_string(),
                keys: keys.to_vec(),
                args: args.to_vec(),
            });
        }

        if let Some(message) = &state.failure {
            return Err(StoreError::Command(message.clone()));
        }
        if state.flush_every_call {
            state.loaded.clear();
        }
        if !state.loaded.contains(sha) {
            return Err(StoreError::NoScript(
                "NOSCRIPT No matching script. Please use EVAL.".to_string(),
            ));
        }

        let now = Instant::now();
        if sha == ACQUIRE.sha() {
            let ttl: u64 = args[0]
                .parse()
                .map_err(|_| StoreError::Command("ERR value is not an integer".to_string()))?;
            if ttl == 0 {
                return Err(StoreError::Command(
                    "ERR invalid expire time in 'set' command".to_string(),
                ));
            }
            let held = state.keys.get(&keys[0]).is_some_and(|deadline| *deadline > now);
            if held {
                return Ok(None);
            }
            state
                .keys
                .insert(keys[0].clone(), now + Duration::from_millis(ttl));
            Ok(Some("OK".to_string()))
        } else if sha == RELEASE.sha() {
            state.keys.remove(&keys[0]);
            Ok(None)
        } else {
            Err(StoreError::Command("ERR unexpected script".to_string()))
        }
    }

    async fn script_load(&self, source: &str) -> Result<String, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.loads += 1;

        if let Some(message) = &state.failure {
            return Err(StoreError::Command(message.clone()));
        }

        let script = SCRIPTS
            .iter()
            .find(|s| s.source() == source)
            .ok_or_else(|| StoreError::Command("ERR unknown script".to_string()))?;
        let sha = script.sha().to_string();
        state.loaded.insert(sha.clone());
        Ok(sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_starts_without_scripts() {
        let store = MockStore::new();
        let result = store
            .evalsha(ACQUIRE.sha(), &["k".to_string()], &["100".to_string()])
            .await;
        assert!(matches!(result, Err(StoreError::NoScript(_))));
    }

    #[tokio::test]
    async fn test_mock_store_set_nx() {
        let store = MockStore::preloaded();
        let keys = ["k".to_string()];
        let args = ["1000".to_string()];
        assert!(store.evalsha(ACQUIRE.sha(), &keys, &args).await.unwrap().is_some());
        assert!(store.evalsha(ACQUIRE.sha(), &keys, &args).await.unwrap().is_none());
        assert!(store.is_held("k"));
    }
}
