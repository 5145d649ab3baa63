//! Process counters
//!
//! `Stats` is an explicitly owned aggregate: whoever updates counters holds an
//! `Arc<Stats>` and readers take a [`StatsSnapshot`]. Counters never decrease;
//! `last_processed_at` is overwritten after every round.

use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams received, valid or not
    pub total_received: u64,
    /// Transactions applied (fully or fee-only)
    pub total_processed: u64,
    /// Transactions rejected before queueing
    pub total_invalid: u64,
    /// Fees moved to the validator account
    pub total_fees_paid: i64,
    /// Transactions whose instructions were applied
    pub fully_applied: u64,
    /// Transactions that only paid the fee
    pub fee_only: u64,
    /// Transactions that could not be applied at all
    pub apply_failed: u64,
    /// Settlement rounds completed
    pub rounds: u64,
    /// When the last round finished applying
    pub last_processed_at: DateTime<Utc>,
    /// When the counters were created
    pub started_at: DateTime<Utc>,
}

impl StatsSnapshot {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            total_received: 0,
            total_processed: 0,
            total_invalid: 0,
            total_fees_paid: 0,
            fully_applied: 0,
            fee_only: 0,
            apply_failed: 0,
            rounds: 0,
            last_processed_at: started_at,
            started_at,
        }
    }
}

/// Per-round totals reported by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTally {
    /// Transactions whose instructions were applied
    pub fully_applied: u64,
    /// Transactions that only paid the fee
    pub fee_only: u64,
    /// Transactions that could not be applied
    pub failed: u64,
    /// Fees actually charged
    pub fees: i64,
}

impl RoundTally {
    /// Transactions that reached the validator account
    pub fn processed(&self) -> u64 {
        self.fully_applied + self.fee_only
    }
}

/// Lock-protected counters
#[derive(Debug)]
pub struct Stats {
    inner: RwLock<StatsSnapshot>,
}

impl Stats {
    /// Create counters starting at zero
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            inner: RwLock::new(StatsSnapshot::new(started_at)),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, StatsSnapshot> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> RwLockReadGuard<'_, StatsSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a transaction that was received and accepted into the queue
    pub fn record_received(&self) {
        self.write().total_received += 1;
    }

    /// Count a transaction that was received and rejected
    pub fn record_rejected(&self) {
        let mut stats = self.write();
        stats.total_received += 1;
        stats.total_invalid += 1;
    }

    /// Fold one settled round into the counters
    pub fn record_round(&self, tally: RoundTally, finished_at: DateTime<Utc>) {
        let mut stats = self.write();
        stats.total_processed += tally.processed();
        stats.total_fees_paid = stats.total_fees_paid.saturating_add(tally.fees);
        stats.fully_applied += tally.fully_applied;
        stats.fee_only += tally.fee_only;
        stats.apply_failed += tally.failed;
        stats.rounds += 1;
        stats.last_processed_at = finished_at;
    }

    /// Copy of the current counters
    pub fn snapshot(&self) -> StatsSnapshot {
        self.read().clone()
    }
}
