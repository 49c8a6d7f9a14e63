//! LRU TTL Cache - demo workload
//!
//! Drives a shared [`LockedCache`] from several threads and prints a JSON
//! summary of what happened.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{CacheConfig, LockedCache};

/// Counters collected by one worker.
#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    adds: u64,
    hits: u64,
    misses: u64,
    removes: u64,
}

impl WorkerTally {
    fn merge(mut self, other: WorkerTally) -> Self {
        self.adds += other.adds;
        self.hits += other.hits;
        self.misses += other.misses;
        self.removes += other.removes;
        self
    }
}

/// Summary printed at the end of the run.
#[derive(Debug, Serialize)]
struct RunSummary {
    config: CacheConfig,
    len: usize,
    adds: u64,
    hits: u64,
    misses: u64,
    removes: u64,
    hit_rate: f64,
    elapsed_ms: u128,
}

/// Main entry point for the demo workload.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the shared cache
/// 4. Run the workers and join them
/// 5. Print the summary as JSON
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}s, refresh_on_access={}, workers={}, ops_per_worker={}",
        config.capacity,
        config.ttl_secs,
        config.refresh_on_access,
        config.workers,
        config.ops_per_worker
    );

    let cache: Arc<LockedCache<String, String>> = Arc::new(
        config
            .build_locked()
            .context("failed to build cache from configuration")?,
    );

    // Twice the capacity so that the workload keeps evicting
    let key_space = config.capacity.saturating_mul(2).max(1);
    let started = Instant::now();

    let handles: Vec<_> = (0..config.workers)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let ops = config.ops_per_worker;
            thread::spawn(move || run_worker(&cache, worker, ops, key_space))
        })
        .collect();

    let mut tally = WorkerTally::default();
    for handle in handles {
        let worker_tally = handle
            .join()
            .map_err(|_| anyhow!("worker thread panicked"))?;
        tally = tally.merge(worker_tally);
    }

    let lookups = tally.hits + tally.misses;
    let summary = RunSummary {
        len: cache.len(),
        adds: tally.adds,
        hits: tally.hits,
        misses: tally.misses,
        removes: tally.removes,
        hit_rate: if lookups == 0 {
            0.0
        } else {
            tally.hits as f64 / lookups as f64
        },
        elapsed_ms: started.elapsed().as_millis(),
        config,
    };
    info!(
        "Workload finished: len={}, hit_rate={:.3}",
        summary.len, summary.hit_rate
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Issues a deterministic mix of adds, gets and removes.
///
/// Keys are walked with a stride that differs per worker so that workers
/// overlap on some keys and not others.
fn run_worker(
    cache: &LockedCache<String, String>,
    worker: usize,
    ops: usize,
    key_space: usize,
) -> WorkerTally {
    let mut tally = WorkerTally::default();
    let stride = 2 * worker + 1;

    for i in 0..ops {
        let key = format!("key-{}", (i * stride) % key_space);
        match i % 10 {
            0..=2 => {
                cache.add(key, format!("worker-{worker}-op-{i}"));
                tally.adds += 1;
            }
            3..=8 => {
                if cache.get(key.as_str()).is_some() {
                    tally.hits += 1;
                } else {
                    tally.misses += 1;
                }
            }
            _ => {
                cache.remove(key.as_str());
                tally.removes += 1;
            }
        }
    }

    debug!(worker, ?tally, "worker finished");
    tally
}
