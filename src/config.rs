//! Validator configuration
//!
//! Every knob has a default; the CLI only overrides what it is given.

use crate::service::SchedulerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:2001";
pub const DEFAULT_SINK_URL: &str = "http://localhost:2002/";
pub const DEFAULT_MAX_TX_PER_BATCH: usize = 100;
pub const DEFAULT_MAX_BATCHES_PER_SEC: usize = 100;
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime configuration for the validator process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Initial balance snapshot
    pub snapshot_path: PathBuf,
    /// UDP address transactions arrive on
    pub listen_addr: SocketAddr,
    /// Where settlement rounds are posted
    pub sink_url: String,
    /// Directory per-round snapshots are written to
    pub snapshot_dir: PathBuf,
    /// Most transactions in one round
    pub max_tx_per_batch: usize,
    /// Most rounds settled per one-second tick
    pub max_batches_per_sec: usize,
    /// Period of the stats log line
    pub stats_interval: Duration,
    /// Request timeout for the batch sink
    pub sink_timeout: Duration,
    /// Tokio worker threads
    pub worker_threads: usize,
}

impl ValidatorConfig {
    /// Configuration with every default except the snapshot path
    pub fn with_snapshot(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 2001)),
            sink_url: DEFAULT_SINK_URL.to_string(),
            snapshot_dir: PathBuf::from("."),
            max_tx_per_batch: DEFAULT_MAX_TX_PER_BATCH,
            max_batches_per_sec: DEFAULT_MAX_BATCHES_PER_SEC,
            stats_interval: DEFAULT_STATS_INTERVAL,
            sink_timeout: DEFAULT_SINK_TIMEOUT,
            worker_threads: num_cpus::get(),
        }
    }

    /// Replace zero limits with their defaults, warning about each one
    pub fn sanitized(mut self) -> Self {
        self.max_tx_per_batch =
            non_zero_or_default("max_tx_per_batch", self.max_tx_per_batch, DEFAULT_MAX_TX_PER_BATCH);
        self.max_batches_per_sec = non_zero_or_default(
            "max_batches_per_sec",
            self.max_batches_per_sec,
            DEFAULT_MAX_BATCHES_PER_SEC,
        );
        self.worker_threads =
            non_zero_or_default("worker_threads", self.worker_threads, num_cpus::get());

        if self.stats_interval.is_zero() {
            warn!(
                default = ?DEFAULT_STATS_INTERVAL,
                "Invalid stats_interval (0), using default"
            );
            self.stats_interval = DEFAULT_STATS_INTERVAL;
        }
        if self.sink_timeout.is_zero() {
            warn!(
                default = ?DEFAULT_SINK_TIMEOUT,
                "Invalid sink_timeout (0), using default"
            );
            self.sink_timeout = DEFAULT_SINK_TIMEOUT;
        }

        self
    }

    /// Round limits for the scheduler
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_tx_per_batch: self.max_tx_per_batch,
            max_batches_per_tick: self.max_batches_per_sec,
        }
    }
}

fn non_zero_or_default(name: &str, value: usize, default: usize) -> usize {
    if value == 0 {
        warn!(field = name, default, "Invalid value (0), using default");
        default
    } else {
        value
    }
}
