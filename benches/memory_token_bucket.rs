use std::{hint::black_box, sync::Arc};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use rate_bastion::{
    Capacity, MemoryStore, RefillIntervalSeconds, TokenBucketOptions, TokenBucketRateLimiter,
};

fn limiter(capacity: u64, refill_interval_seconds: u64) -> TokenBucketRateLimiter<MemoryStore> {
    TokenBucketRateLimiter::new(
        Arc::new(MemoryStore::new()),
        TokenBucketOptions {
            capacity: Capacity::try_from(capacity).unwrap(),
            refill_interval_seconds: RefillIntervalSeconds::try_from(refill_interval_seconds)
                .unwrap(),
        },
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn bench_hot_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_token_bucket/hot_key");
    group.sample_size(200);

    let rt = runtime();

    group.bench_function("is_request_allowed/allowed", |b| {
        let limiter = limiter(u64::MAX, 3600);

        b.iter(|| {
            let res = rt.block_on(limiter.is_request_allowed(black_box("k")));
            black_box(res)
        });
    });

    group.bench_function("is_request_allowed/rejected", |b| {
        let limiter = limiter(1, 3600);
        let _ = rt.block_on(limiter.is_request_allowed("k"));

        b.iter(|| {
            let res = rt.block_on(limiter.is_request_allowed(black_box("k")));
            black_box(res)
        });
    });

    group.bench_function("available_tokens", |b| {
        let limiter = limiter(100, 3600);
        let _ = rt.block_on(limiter.is_request_allowed("k"));

        b.iter(|| {
            let res = rt.block_on(limiter.available_tokens(black_box("k")));
            black_box(res)
        });
    });

    group.finish();
}

fn bench_many_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_token_bucket/many_keys");
    group.sample_size(100);

    let rt = runtime();

    for key_space in [1_000_usize, 100_000] {
        group.bench_function(format!("is_request_allowed/keys={key_space}"), |b| {
            let limiter = limiter(10, 60);
            let keys: Vec<String> = (0..key_space).map(|i| format!("user_{i}")).collect();

            b.iter_batched(
                || 0_usize,
                |mut idx| {
                    idx = idx.wrapping_add(1);
                    let k = &keys[idx % keys.len()];
                    let _ = black_box(rt.block_on(limiter.is_request_allowed(black_box(k))));
                    idx
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hot_key, bench_many_keys);
criterion_main!(benches);
