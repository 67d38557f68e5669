//! LRU/TTL Cache - profiling harness
//!
//! Drives a cache with concurrent mixed `set`/`get` workloads and logs
//! throughput, hit counts and the final entry count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, Config};

/// Every fourth operation is a `set`, the rest are `get`s.
const SET_EVERY: usize = 4;

/// Main entry point for the profiling harness.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache with the configured capacity
/// 4. Run the configured number of concurrent workers
/// 5. Log throughput and final cache size
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}ms, workers={}, ops/worker={}, key_space={}",
        config.capacity,
        config.default_ttl_ms,
        config.workers,
        config.ops_per_worker,
        config.key_space
    );

    let cache: Cache<u64> = Cache::from_config(&config).context("failed to build cache")?;
    let hits = Arc::new(AtomicU64::new(0));
    let started = Instant::now();

    let mut workers = Vec::with_capacity(config.workers);
    for worker in 0..config.workers {
        let cache = cache.clone();
        let hits = Arc::clone(&hits);
        let config = config.clone();

        workers.push(tokio::spawn(async move {
            run_worker(worker, &cache, &config, &hits).await;
        }));
    }

    for handle in workers {
        handle.await.context("worker task failed")?;
    }

    let elapsed = started.elapsed();
    let total_ops = (config.workers * config.ops_per_worker) as f64;
    let len = cache.len().await;

    info!(
        "Completed {} ops in {:?} ({:.0} ops/sec), hits={}, entries={}/{}",
        total_ops,
        elapsed,
        total_ops / elapsed.as_secs_f64().max(f64::EPSILON),
        hits.load(Ordering::Relaxed),
        len,
        cache.capacity()
    );

    if len > cache.capacity() {
        warn!("Cache holds more entries than its capacity");
        anyhow::bail!("capacity invariant violated: {len} > {}", cache.capacity());
    }

    Ok(())
}

/// Runs one worker's share of the workload.
///
/// Keys are picked by a multiplicative stride over the key space so that
/// workers overlap without needing a random number generator.
async fn run_worker(worker: usize, cache: &Cache<u64>, config: &Config, hits: &AtomicU64) {
    let ttl = config.default_ttl();

    for op in 0..config.ops_per_worker {
        let slot = (op.wrapping_mul(2_654_435_761) ^ worker) % config.key_space;
        let key = format!("key{slot}");

        if op % SET_EVERY == 0 {
            cache.set(key, op as u64, ttl).await;
        } else if cache.get(&key).await.is_some() {
            hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}
