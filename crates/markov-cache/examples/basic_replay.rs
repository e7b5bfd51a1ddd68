//! Minimal in-memory replay: load a key population, flush, then replay a
//! cyclic access pattern and print the resulting hit ratios.

use markov_cache_rs::metrics::ReplayStats;
use markov_cache_rs::{AccumulatorKind, CacheConfig, MarkovCache};

fn main() {
    let cfg = CacheConfig {
        cache_capacity: 64.0,
        accumulator: AccumulatorKind::TransitionLength,
        accesses_threshold: 3,
        forecast_length: 1,
    };

    let mut cache = MarkovCache::new(cfg).expect("config is valid");

    // Register 32 items of varying size, then start measurement cold.
    let sizes: Vec<f32> = (0..32u64).map(|id| 1.0 + (id % 7) as f32).collect();
    for (id, &size) in sizes.iter().enumerate() {
        cache.process_set_request(id as u64, size);
    }
    cache.flush();

    // A looping working set with an occasional excursion.
    let mut stats = ReplayStats::default();
    for round in 0..50u64 {
        for id in 0..8u64 {
            let key = if round % 10 == 9 { 24 + id } else { id };
            let hit = cache.process_get_request(&key);
            stats.record(hit, sizes[key as usize] as u64);
        }
    }

    println!("Object hit ratio: {}", stats.object_hit_ratio());
    println!("Byte hit ratio: {}", stats.byte_hit_ratio());
}
