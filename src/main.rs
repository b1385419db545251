//! Memo Cache demo
//!
//! Runs a simulated read-through workload against the cache and logs the
//! statistics after every round.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::{Cache, CacheConfig};

/// Concurrent callers per round
const WORKERS: usize = 8;
/// Lookups each caller performs per round
const LOOKUPS_PER_WORKER: usize = 25;
/// Number of distinct keys the callers ask for
const KEYSPACE: usize = 40;
/// Simulated latency of the backing fetch
const FETCH_LATENCY: Duration = Duration::from_millis(20);

/// Main entry point for the demo workload.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the background cleanup task)
/// 4. Run workload rounds until `DEMO_ROUNDS` is reached or Ctrl+C arrives
/// 5. Close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Memo Cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_size={}, default_ttl={}ms, cleanup_interval={}ms",
        config.max_size,
        config.default_ttl.as_millis(),
        config.cleanup_interval.as_millis()
    );

    let rounds: usize = match std::env::var("DEMO_ROUNDS") {
        Ok(raw) => raw.parse().context("DEMO_ROUNDS must be a positive integer")?,
        Err(_) => 5,
    };

    let cache: Arc<Cache<String, String>> =
        Arc::new(Cache::new(config).context("failed to create cache")?);

    tokio::select! {
        result = run_rounds(cache.clone(), rounds) => result?,
        _ = signal::ctrl_c() => info!("Received Ctrl+C, stopping workload"),
    }

    let stats = cache.stats();
    info!("Final stats: {}", serde_json::to_string(&stats)?);

    match Arc::try_unwrap(cache) {
        Ok(mut cache) => cache.close(),
        Err(_) => warn!("Cache still shared at shutdown; cleanup stops when the last handle drops"),
    }

    info!("Demo complete");
    Ok(())
}

async fn run_rounds(cache: Arc<Cache<String, String>>, rounds: usize) -> anyhow::Result<()> {
    for round in 1..=rounds {
        let mut workers = JoinSet::new();

        for worker in 0..WORKERS {
            let cache = cache.clone();
            workers.spawn(async move {
                let mut failures = 0usize;
                for lookup in 0..LOOKUPS_PER_WORKER {
                    let key = format!("item:{}", (worker * 7 + lookup * 13 + round) % KEYSPACE);
                    let fetch_key = key.clone();
                    let result = cache
                        .get_cached_or_fetch(key, || fetch_item(fetch_key), None)
                        .await;
                    if result.is_err() {
                        failures += 1;
                    }
                }
                failures
            });
        }

        let mut failures = 0;
        while let Some(joined) = workers.join_next().await {
            failures += joined.context("worker task panicked")?;
        }

        let stats = cache.stats();
        info!(
            round,
            failures,
            "Round complete: {}",
            serde_json::to_string(&stats)?
        );
    }

    Ok(())
}

/// Simulated slow backend; keys ending in 9 are unavailable.
async fn fetch_item(key: String) -> anyhow::Result<String> {
    tokio::time::sleep(FETCH_LATENCY).await;
    if key.ends_with('9') {
        anyhow::bail!("backend unavailable for {key}");
    }
    Ok(format!("payload for {key}"))
}
