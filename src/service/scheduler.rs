//! Batch scheduler
//!
//! Drives settlement. On every tick it pulls conflict-free rounds from the
//! engine until either the per-tick round limit is reached or a round comes
//! back empty. Each round is then processed in three steps:
//!
//! 1. hand the round to the [`BatchSink`]. If the hand-off itself fails the
//!    round is logged and dropped: nothing is applied or saved.
//! 2. apply every transaction to the local ledger, whatever status the sink
//!    answered with.
//! 3. save a balance snapshot. Failures are logged.
//!
//! Applied mutations are never rolled back.

use super::clock::{Clock, Ticker};
use crate::core::{LedgerEngine, RoundTally};
use crate::io::{BatchSink, SnapshotStore};
use crate::types::Transaction;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Rate and shape limits for settlement rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Most transactions in one round
    pub max_tx_per_batch: usize,
    /// Most rounds settled per tick
    pub max_batches_per_tick: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_tx_per_batch: 100,
            max_batches_per_tick: 100,
        }
    }
}

/// What one tick extracted from the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rounds: usize,
    pub transactions: usize,
}

/// Periodic round extraction, hand-off, application and persistence
pub struct BatchScheduler {
    engine: Arc<LedgerEngine>,
    sink: Arc<dyn BatchSink>,
    snapshots: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    round_index: u64,
}

impl BatchScheduler {
    pub fn new(
        engine: Arc<LedgerEngine>,
        sink: Arc<dyn BatchSink>,
        snapshots: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            sink,
            snapshots,
            clock,
            config,
            round_index: 0,
        }
    }

    /// Rounds settled so far
    pub fn round_index(&self) -> u64 {
        self.round_index
    }

    /// Run until the ticker is exhausted
    pub async fn run<T: Ticker>(&mut self, mut ticker: T) {
        info!(
            max_tx_per_batch = self.config.max_tx_per_batch,
            max_batches_per_tick = self.config.max_batches_per_tick,
            "Batch scheduler started"
        );

        while ticker.tick().await {
            self.run_tick().await;
        }
    }

    /// Settle up to `max_batches_per_tick` rounds, stopping at the first empty one
    pub async fn run_tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        while report.rounds < self.config.max_batches_per_tick {
            let round = self.engine.extract_round(self.config.max_tx_per_batch);
            if round.is_empty() {
                break;
            }
            report.rounds += 1;
            report.transactions += round.len();
            self.settle_round(&round).await;
        }

        report
    }

    async fn settle_round(&mut self, round: &[Transaction]) {
        let receipt = match self.sink.submit(round).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(error = %e, size = round.len(), "Failed to hand off round, dropping it");
                return;
            }
        };
        if !receipt.is_success() {
            warn!(status = receipt.status, "Batch sink reported failure");
        }

        let tally = self.engine.apply_round(round);
        self.round_index += 1;
        let finished_at = self.clock.now();
        self.engine.stats().record_round(tally, finished_at);

        info!(
            round = self.round_index,
            size = round.len(),
            status = receipt.status,
            fully_applied = tally.fully_applied,
            fee_only = tally.fee_only,
            failed = tally.failed,
            "Settled round"
        );
        info!(
            round = self.round_index,
            fees = tally.fees,
            avg_fee = %format!("{:.2}", average_fee(&tally, round.len())),
            "Validator earned fees"
        );

        let balances = self.engine.balances();
        if let Err(e) = self
            .snapshots
            .save(&balances, finished_at.timestamp(), self.round_index)
            .await
        {
            error!(round = self.round_index, error = %e, "Failed to save snapshot");
        }
    }
}

fn average_fee(tally: &RoundTally, round_len: usize) -> f64 {
    if round_len == 0 {
        0.0
    } else {
        tally.fees as f64 / round_len as f64
    }
}
