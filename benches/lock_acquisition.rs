//! Benchmarks for the uncontended lock/unlock path

use criterion::{Criterion, criterion_group, criterion_main};
use simple_lock_core::prelude::*;
use std::hint::black_box;
use std::time::Duration;

#[path = "../tests/common/mock_store.rs"]
#[allow(dead_code)]
mod mock_store;

use mock_store::MockStore;

fn bench_lock_unlock(c: &mut Criterion) {
    let locks = LockCoordinator::new(MockStore::preloaded().without_call_log(), LockConfig::default());

    let mut group = c.benchmark_group("coordinator");
    group.bench_function("lock_unlock", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                if let Ok(true) = locks.lock(black_box("bench-lock"), Duration::from_secs(5)).await {
                    locks.unlock("bench-lock").await;
                }
            });
    });

    group.bench_function("backoff_for_attempt", |b| {
        b.iter(|| locks.backoff_for_attempt(black_box(2)));
    });

    group.finish();
}

criterion_group!(benches, bench_lock_unlock);
criterion_main!(benches);
