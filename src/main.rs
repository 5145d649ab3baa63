//! Ledger Validator
//!
//! Receives JSON transactions over UDP, settles them in conflict-free rounds
//! and writes a balance snapshot after every round.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.json
//! cargo run -- --listen 127.0.0.1:2001 --sink-url http://localhost:2002/ accounts.json
//! cargo run -- --max-tx-per-batch 50 --max-batches-per-sec 10 --snapshot-dir snapshots accounts.json
//! RUST_LOG=debug cargo run -- accounts.json
//! ```
//!
//! Logs go to stderr. The process runs until Ctrl-C.
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown
//! - 1: Start-up error (snapshot not found or unreadable, address in use, etc.)

use anyhow::{Context, Result};
use ledger_validator::cli;
use ledger_validator::config::ValidatorConfig;
use ledger_validator::core::{LedgerEngine, Stats};
use ledger_validator::io::{load_snapshot, FileSnapshotStore, HttpBatchSink, UdpListener};
use ledger_validator::service::{
    run_stats_reporter, BatchScheduler, Clock, IntervalTicker, SystemClock,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = cli::parse_args().to_validator_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: ValidatorConfig) -> Result<()> {
    let balances = load_snapshot(&config.snapshot_path)
        .await
        .context("Failed to load initial snapshot")?;
    info!(
        path = %config.snapshot_path.display(),
        accounts = balances.len(),
        "Snapshot loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stats = Arc::new(Stats::new(clock.now()));
    let engine = Arc::new(LedgerEngine::new(balances, Arc::clone(&stats)));

    let listener = UdpListener::bind(config.listen_addr, Arc::clone(&engine))
        .await
        .with_context(|| format!("Failed to bind UDP listener on {}", config.listen_addr))?;
    let sink = HttpBatchSink::new(config.sink_url.clone(), config.sink_timeout)
        .context("Failed to create batch sink")?;
    let snapshots = FileSnapshotStore::new(config.snapshot_dir.clone());

    let listener_task = tokio::spawn(listener.run());
    let reporter_task = tokio::spawn(run_stats_reporter(
        Arc::clone(&stats),
        Arc::clone(&clock),
        IntervalTicker::new(config.stats_interval),
    ));

    let mut scheduler = BatchScheduler::new(
        engine,
        Arc::new(sink),
        Arc::new(snapshots),
        clock,
        config.scheduler_config(),
    );

    info!(addr = %config.listen_addr, sink = %config.sink_url, "Validator is up");

    let shutdown = tokio::select! {
        _ = scheduler.run(IntervalTicker::new(Duration::from_secs(1))) => Ok(()),
        signal = tokio::signal::ctrl_c() => signal,
    };
    shutdown.context("Failed to listen for shutdown signal")?;
    info!(rounds = scheduler.round_index(), "Shutting down");

    listener_task.abort();
    reporter_task.abort();

    Ok(())
}
