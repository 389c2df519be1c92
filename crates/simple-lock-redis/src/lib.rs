//! Redis backend for simple-lock.
//!
//! Scripts run with `EVALSHA`; a `NOSCRIPT` reply makes the coordinator
//! reload them with `SCRIPT LOAD` and retry once.

pub mod builder;
pub mod store;

pub use builder::{connect, RedisLockCoordinator, RedisLockCoordinatorBuilder};
pub use store::RedisScriptStore;
