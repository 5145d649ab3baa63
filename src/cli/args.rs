use crate::config::{ValidatorConfig, DEFAULT_LISTEN_ADDR, DEFAULT_SINK_URL};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Validate, batch and settle ledger transactions received over UDP
#[derive(Parser, Debug)]
#[command(name = "ledger-validator")]
#[command(about = "Validate, batch and settle ledger transactions received over UDP", long_about = None)]
pub struct CliArgs {
    /// Initial balance snapshot (JSON object of account -> balance)
    #[arg(value_name = "SNAPSHOT", help = "Path to the initial accounts JSON file")]
    pub snapshot_file: PathBuf,

    /// UDP address to receive transactions on
    #[arg(
        long = "listen",
        value_name = "ADDR",
        default_value = DEFAULT_LISTEN_ADDR,
        help = "UDP address to receive transactions on"
    )]
    pub listen_addr: SocketAddr,

    /// Settlement endpoint
    #[arg(
        long = "sink-url",
        value_name = "URL",
        default_value = DEFAULT_SINK_URL,
        help = "HTTP endpoint settlement rounds are posted to"
    )]
    pub sink_url: String,

    /// Directory for per-round snapshot files
    #[arg(
        long = "snapshot-dir",
        value_name = "DIR",
        default_value = ".",
        help = "Directory per-round snapshot files are written to"
    )]
    pub snapshot_dir: PathBuf,

    /// Transactions per round
    #[arg(
        long = "max-tx-per-batch",
        value_name = "COUNT",
        help = "Most transactions in one round (default: 100)"
    )]
    pub max_tx_per_batch: Option<usize>,

    /// Rounds per second
    #[arg(
        long = "max-batches-per-sec",
        value_name = "COUNT",
        help = "Most rounds settled per second (default: 100)"
    )]
    pub max_batches_per_sec: Option<usize>,

    /// Stats log period in seconds
    #[arg(
        long = "stats-interval",
        value_name = "SECS",
        help = "Seconds between stats log lines (default: 30)"
    )]
    pub stats_interval_secs: Option<u64>,

    /// Batch sink request timeout in seconds
    #[arg(
        long = "sink-timeout",
        value_name = "SECS",
        help = "Seconds before a settlement request is abandoned (default: 5)"
    )]
    pub sink_timeout_secs: Option<u64>,

    /// Tokio worker threads
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Runtime worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,
}

impl CliArgs {
    /// Build a `ValidatorConfig` from CLI arguments
    ///
    /// Options that were not given keep their defaults. Zero values are
    /// replaced by defaults with a warning.
    pub fn to_validator_config(&self) -> ValidatorConfig {
        let default = ValidatorConfig::with_snapshot(self.snapshot_file.clone());

        ValidatorConfig {
            listen_addr: self.listen_addr,
            sink_url: self.sink_url.clone(),
            snapshot_dir: self.snapshot_dir.clone(),
            max_tx_per_batch: self.max_tx_per_batch.unwrap_or(default.max_tx_per_batch),
            max_batches_per_sec: self
                .max_batches_per_sec
                .unwrap_or(default.max_batches_per_sec),
            stats_interval: self
                .stats_interval_secs
                .map_or(default.stats_interval, Duration::from_secs),
            sink_timeout: self
                .sink_timeout_secs
                .map_or(default.sink_timeout, Duration::from_secs),
            worker_threads: self.worker_threads.unwrap_or(default.worker_threads),
            ..default
        }
        .sanitized()
    }
}
