//! Lease-based mutual exclusion across processes through Redis.
//!
//! Processes on any number of hosts take turns on a named resource by setting
//! a key that expires on its own. Acquisition retries with a fixed or custom
//! delay plus jitter; release is best-effort.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use simple_lock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let locks = RedisLockCoordinatorBuilder::new()
//!         .url("redis://localhost:6379")
//!         .build()
//!         .await?;
//!
//!     // Take the lock for up to 10 seconds; released when the body finishes
//!     let done = locks
//!         .lock_with("nightly-report", Duration::from_secs(10), |locked| async move {
//!             if locked {
//!                 println!("Doing critical work...");
//!             }
//!             locked
//!         })
//!         .await?;
//!
//!     println!("ran: {done}");
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! | setting        | default          | meaning                                  |
//! |----------------|------------------|------------------------------------------|
//! | `retry_count`  | `3`              | retries after the first attempt          |
//! | `retry_delay`  | `200` ms         | base wait between attempts               |
//! | `retry_jitter` | `50` ms          | exclusive bound of random extra wait     |
//! | `retry_proc`   | none             | replaces `retry_delay` per retry number  |
//! | `key_prefix`   | `"simple_lock:"` | namespace prepended to every key         |
//!
//! The configuration can be changed on a live coordinator with
//! `set_config`/`update_config`, or temporarily with `with_config`.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `simple-lock-core`: coordinator, scripts, configuration and the store trait
//! - `simple-lock-redis`: the Redis store and builder

// Re-export core types and traits
#[allow(ambiguous_glob_reexports)]
pub use simple_lock_core::*;

// Re-export redis backend
#[allow(ambiguous_glob_reexports)]
pub use simple_lock_redis::*;
