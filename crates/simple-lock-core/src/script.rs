//! Lua scripts backing the lock and their content hashes.
//!
//! The sources must stay byte-identical: the store caches scripts by the SHA-1
//! of their text, and other processes sharing the store call them by hash.

use std::sync::OnceLock;

use sha1::{Digest, Sha1};

/// Value written to a key while it is locked.
pub const LOCK_VALUE: &str = "1";

/// A server-side script with a lazily computed SHA-1 identifier.
#[derive(Debug)]
pub struct Script {
    name: &'static str,
    source: &'static str,
    sha: OnceLock<String>,
}

impl Script {
    /// Creates a script from its source text.
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            sha: OnceLock::new(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Exact Lua source.
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Lowercase hex SHA-1 of the source, as used by `EVALSHA`.
    pub fn sha(&self) -> &str {
        self.sha.get_or_init(|| sha1_hex(self.source))
    }
}

/// Sets `KEYS[1]` to the lock value if it does not exist, expiring after
/// `ARGV[1]` milliseconds. Replies `OK` when set and nil otherwise.
pub static ACQUIRE: Script = Script::new(
    "acquire",
    "return redis.call('set', KEYS[1], 1, 'NX', 'PX', ARGV[1])",
);

/// Deletes `KEYS[1]` whoever set it.
pub static RELEASE: Script = Script::new("release", "redis.call('del', KEYS[1])");

/// Every script the coordinator may call, in load order.
pub static SCRIPTS: [&Script; 2] = [&ACQUIRE, &RELEASE];

fn sha1_hex(source: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}
