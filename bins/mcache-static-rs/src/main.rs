use std::collections::BTreeMap;
use std::path::Path;
use std::process;

use indicatif::{ProgressBar, ProgressStyle};
use markov_cache_rs::metrics::ReplayStats;
use markov_cache_rs::trace::load_static_trace;
use markov_cache_rs::{AccumulatorKind, CacheConfig, MarkovCache};

fn exit_with_help() -> ! {
    print!(
        "\
Usage: mcache-static-rs <trace-path> <cache-capacity> <accumulator-type> <access-threshold> <forecast-length>
accumulator-type: transitions | states

Replays a GET-only trace (`timestamp item_id item_size` per line): every
distinct item is registered first, the cache is flushed, and the trace is
then replayed as GET requests.
"
    );
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 6 {
        exit_with_help();
    }

    let capacity = args[2].parse::<i64>().unwrap_or_else(|_| {
        eprintln!("invalid cache capacity: {}", args[2]);
        process::exit(1);
    });
    let accumulator = args[3].parse::<AccumulatorKind>().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let accesses_threshold = args[4].parse::<usize>().unwrap_or_else(|_| {
        eprintln!("invalid access threshold: {}", args[4]);
        process::exit(1);
    });
    let forecast_length = args[5].parse::<usize>().unwrap_or_else(|_| {
        eprintln!("invalid forecast length: {}", args[5]);
        process::exit(1);
    });

    let trace = load_static_trace(Path::new(&args[1])).unwrap_or_else(|e| {
        eprintln!("can't read trace file {}: {}", args[1], e);
        process::exit(1);
    });

    let cfg = CacheConfig {
        cache_capacity: capacity as f32,
        accumulator,
        accesses_threshold,
        forecast_length,
    };
    let mut cache = MarkovCache::new(cfg).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    // Pre-register every distinct item in ascending id order, then flush so
    // measurement starts from an empty cache.
    let mut unique_items: BTreeMap<u64, u64> = BTreeMap::new();
    for record in &trace {
        unique_items.insert(record.item_id, record.item_size);
    }

    let bar = ProgressBar::new(unique_items.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Warmup: [{bar:40}] {pos}/{len}")
            .expect("progress template is valid"),
    );

    for (item_id, item_size) in unique_items {
        cache.process_set_request(item_id, item_size as f32);
        bar.inc(1);
    }
    bar.finish();

    cache.flush();

    let mut stats = ReplayStats::default();
    for record in &trace {
        let hit = cache.process_get_request(&record.item_id);
        stats.record(hit, record.item_size);
    }

    println!("Object hit ratio: {}", stats.object_hit_ratio());
    println!("Byte hit ratio: {}", stats.byte_hit_ratio());
}
