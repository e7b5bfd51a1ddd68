use criterion::{black_box, criterion_group, criterion_main, Criterion};
use markov_cache_rs::{AccumulatorKind, CacheConfig, MarkovCache};

/// Deterministic pseudo-random stream for synthetic traces.
fn rng_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state >> 33
}

/// A skewed access stream over `num_keys` keys: most requests land in the
/// first eighth of the key space.
fn synthetic_trace(num_keys: u64, len: usize) -> Vec<u64> {
    let mut state = 0x9E3779B97F4A7C15u64;
    (0..len)
        .map(|_| {
            let r = rng_next(&mut state);
            if r % 4 == 0 {
                r % num_keys
            } else {
                r % (num_keys / 8).max(1)
            }
        })
        .collect()
}

fn warmed_cache(cfg: CacheConfig, num_keys: u64) -> MarkovCache<u64> {
    let mut cache = MarkovCache::new(cfg).expect("config is valid");
    for id in 0..num_keys {
        cache.process_set_request(id, 1.0 + (id % 5) as f32);
    }
    cache.flush();
    cache
}

fn bench_replay_single_step(c: &mut Criterion) {
    let num_keys = 256;
    let trace = synthetic_trace(num_keys, 4096);
    let cfg = CacheConfig {
        cache_capacity: 200.0,
        accumulator: AccumulatorKind::TransitionLength,
        accesses_threshold: 5,
        forecast_length: 1,
    };

    c.bench_function("replay_single_step", |b| {
        b.iter(|| {
            let mut cache = warmed_cache(cfg.clone(), num_keys);
            for key in &trace {
                black_box(cache.process_get_request(black_box(key)));
            }
        })
    });
}

fn bench_replay_forecast_horizon(c: &mut Criterion) {
    let num_keys = 128;
    let trace = synthetic_trace(num_keys, 1024);
    let cfg = CacheConfig {
        cache_capacity: 100.0,
        accumulator: AccumulatorKind::DestinationState,
        accesses_threshold: 3,
        forecast_length: 4,
    };

    c.bench_function("replay_forecast_horizon", |b| {
        b.iter(|| {
            let mut cache = warmed_cache(cfg.clone(), num_keys);
            for key in &trace {
                black_box(cache.process_get_request(black_box(key)));
            }
        })
    });
}

fn bench_warmup_registration(c: &mut Criterion) {
    let cfg = CacheConfig {
        cache_capacity: 200.0,
        accumulator: AccumulatorKind::DestinationState,
        ..Default::default()
    };

    c.bench_function("warmup_registration", |b| {
        b.iter(|| black_box(warmed_cache(cfg.clone(), 512)))
    });
}

criterion_group!(
    benches,
    bench_replay_single_step,
    bench_replay_forecast_horizon,
    bench_warmup_registration
);
criterion_main!(benches);
