//! Demonstrates the admission/eviction sink: every decision the controller
//! makes is printed as it happens.

use markov_cache_rs::{CacheConfig, CacheDelegate, MarkovCache};

struct PrintingDelegate;

impl CacheDelegate<u64> for PrintingDelegate {
    fn admit_item(&self, key: &u64) {
        println!("Admit: {key}");
    }

    fn evict_item(&self, key: &u64) {
        println!("Evict: {key}");
    }
}

fn main() {
    let cfg = CacheConfig {
        cache_capacity: 100.0,
        ..Default::default()
    };

    let mut cache =
        MarkovCache::with_delegate(cfg, Box::new(PrintingDelegate)).expect("config is valid");

    for i in 0..100u64 {
        cache.process_set_request(i, (i + 1) as f32);
    }

    for i in 0..100u64 {
        cache.process_get_request(&i);
    }
}
