//! Retry delay calculations.

use std::time::Duration;

use rand::Rng;

use crate::config::LockConfig;

/// Source of the random part of a retry delay.
pub trait JitterSource: Send + Sync {
    /// Returns an integer in `[0, upper)`, or `0` when `upper` is `0`.
    fn draw(&self, upper: u64) -> u64;
}

/// Draws jitter from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn draw(&self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..upper)
    }
}

impl<F> JitterSource for F
where
    F: Fn(u64) -> u64 + Send + Sync,
{
    fn draw(&self, upper: u64) -> u64 {
        self(upper)
    }
}

/// Delay to wait before the `attempt`-th retry (1-based), given the jitter
/// already drawn.
///
/// The base is `retry_proc(attempt)` when configured, otherwise `retry_delay`.
pub fn delay_for_attempt(config: &LockConfig, attempt: u32, jitter_ms: u64) -> Duration {
    let base_ms = match &config.retry_proc {
        Some(retry_proc) => retry_proc(attempt),
        None => config.retry_delay,
    };
    Duration::from_millis(base_ms.saturating_add(jitter_ms))
}

/// Draws jitter from `jitter` and computes the delay for `attempt`.
pub fn backoff_for_attempt(config: &LockConfig, attempt: u32, jitter: &dyn JitterSource) -> Duration {
    let jitter_ms = jitter.draw(config.retry_jitter);
    delay_for_attempt(config, attempt, jitter_ms)
}
