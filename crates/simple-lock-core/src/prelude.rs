//! Convenience prelude for lock types.

pub use crate::backoff::{JitterSource, ThreadRngJitter};
pub use crate::config::{LockConfig, RetryProc};
pub use crate::coordinator::LockCoordinator;
pub use crate::error::{LockError, LockResult};
pub use crate::store::{ScriptStore, StoreError};
