use std::hint::black_box;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use expensekit::policy::lfu::LfuCache;
use expensekit::sync::SharedLfuCache;
use expensekit::traits::ConcurrentCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1024;

fn filled(capacity: usize) -> LfuCache<i64, i64> {
    let mut cache = LfuCache::new(capacity);
    for i in 0..capacity as i64 {
        cache.put(i, i);
    }
    cache
}

/// Keys skewed towards a small hot set: 80% of draws from the first 10%.
fn skewed_keys(n: usize, universe: i64, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hot = (universe / 10).max(1);
    (0..n)
        .map(|_| {
            if rng.gen_bool(0.8) {
                rng.gen_range(0..hot)
            } else {
                rng.gen_range(0..universe)
            }
        })
        .collect()
}

fn bench_put_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_engine");
    group.throughput(Throughput::Elements(CAPACITY as u64 * 2));
    group.bench_function("put_evict_get", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                for i in 0..CAPACITY as i64 {
                    cache.put(black_box(i + 10_000), i);
                    let _ = black_box(cache.get(&black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_get_hotset(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_engine");
    group.throughput(Throughput::Elements(CAPACITY as u64));
    group.bench_function("get_hotset", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                for i in 0..CAPACITY as i64 {
                    let _ = black_box(cache.get(&black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_skewed_workload(c: &mut Criterion) {
    let keys = skewed_keys(16 * 1024, 8 * CAPACITY as i64, 42);
    let mut group = c.benchmark_group("lfu_engine");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("skewed_read_through", |b| {
        b.iter_batched(
            || LfuCache::<i64, i64>::new(CAPACITY),
            |mut cache| {
                for &key in &keys {
                    if cache.get(&key).is_none() {
                        cache.put(key, key);
                    }
                }
                black_box(cache.len())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_shared(c: &mut Criterion) {
    let keys = skewed_keys(4096, 4 * CAPACITY as i64, 7);
    let mut group = c.benchmark_group("lfu_shared");
    group.throughput(Throughput::Elements(keys.len() as u64));
    for shards in [1usize, 8] {
        group.bench_function(format!("read_through_{shards}_shards"), |b| {
            b.iter_batched(
                || SharedLfuCache::<i64, i64>::with_shards(CAPACITY, shards, 0),
                |cache| {
                    for &key in &keys {
                        if cache.get(&key).is_none() {
                            cache.put(key, key);
                        }
                    }
                    black_box(cache.len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_put_get,
    bench_get_hotset,
    bench_skewed_workload,
    bench_shared
);
criterion_main!(benches);
