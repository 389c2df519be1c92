//! Example: Using Redis lease locks
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set REDIS_URL environment variable
//! or modify the URL below. Set RUST_LOG=debug to see retries.

use simple_lock::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Get Redis URL from environment or use default
    let redis_url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let locks = RedisLockCoordinatorBuilder::new()
        .url(&redis_url)
        .retry_count(5)
        .retry_proc(|attempt| u64::from(attempt) * 150)
        .build()
        .await?;

    // Take the lock by hand
    println!("Acquiring lock...");
    if locks.lock("example-resource", Duration::from_secs(30)).await? {
        println!("Lock acquired! (expires on its own after 30s)");
        tokio::time::sleep(Duration::from_secs(1)).await;
        locks.unlock("example-resource").await;
        println!("Lock released");
    } else {
        println!("Someone else holds the lock");
    }

    // Scoped usage: released when the body returns
    let outcome = locks
        .lock_with("example-report", Duration::from_secs(30), |locked| async move {
            if !locked {
                return "skipped";
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
            "generated"
        })
        .await?;
    println!("Report {outcome}");

    // Temporarily fail fast instead of waiting
    let busy = locks
        .with_config(
            |config| config.retry_count = 0,
            || locks.lock("example-resource", Duration::from_secs(30)),
        )
        .await?;
    println!("Fast attempt acquired: {busy}");
    if busy {
        locks.unlock("example-resource").await;
    }

    Ok(())
}
