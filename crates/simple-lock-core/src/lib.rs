//! Core types for lease locks kept in a shared key-value store.
//!
//! A lock is a key set with `SET NX PX` inside a server-side script and
//! removed with `DEL`. Backends implement [`ScriptStore`]; the
//! [`LockCoordinator`] owns retries, backoff and script-cache recovery.

pub mod backoff;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod prelude;
pub mod script;
pub mod store;

pub use error::{LockError, LockResult};
pub use prelude::*;
