use std::path::Path;
use std::process;

use markov_cache_rs::metrics::ReplayStats;
use markov_cache_rs::trace::{load_dynamic_trace, TraceAction};
use markov_cache_rs::{AccumulatorKind, CacheConfig, MarkovCache};

fn exit_with_help() -> ! {
    print!(
        "\
Usage: mcache-dynamic-rs <trace-path> <cache-capacity> <accumulator-type> <access-threshold> <forecast-length>
accumulator-type: transitions | states

Replays a mixed trace (`action timestamp item_id item_size` per line, action
`s` for SET and `g` for GET). Hit ratios are reported over the GET requests.
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

    let trace = load_dynamic_trace(Path::new(&args[1])).unwrap_or_else(|e| {
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

    let mut stats = ReplayStats::default();

    for record in &trace {
        match record.action {
            TraceAction::Set => {
                cache.process_set_request(record.item_id, record.item_size as f32);
            }
            TraceAction::Get => {
                let hit = cache.process_get_request(&record.item_id);
                stats.record(hit, record.item_size);
            }
        }
    }

    println!("Object hit ratio: {}", stats.object_hit_ratio());
    println!("Byte hit ratio: {}", stats.byte_hit_ratio());
}
