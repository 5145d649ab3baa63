//! Ledger engine orchestration
//!
//! This module provides the `LedgerEngine` struct, which ties together the
//! balance store, the admission queue, the applier and the stats counters.
//!
//! # Architecture
//!
//! ```text
//! LedgerEngine
//!     ├── Arc<BalanceStore>   (authoritative balances, own lock)
//!     ├── AdmissionQueue      (pending transactions, own lock)
//!     ├── Applier             (fee + conditional instruction application)
//!     └── Arc<Stats>          (counters shared with the reporter)
//! ```
//!
//! # Thread Safety
//!
//! The engine is shared as `Arc<LedgerEngine>` between one ingestion task per
//! datagram and the single scheduler task. The two locks are never held at the
//! same time: `ingest` validates under the balance lock, releases it, then
//! appends under the queue lock.

use super::admission_queue::AdmissionQueue;
use super::applier::{ApplyOutcome, Applier};
use super::balance_store::BalanceStore;
use super::stats::{RoundTally, Stats};
use super::validator::{validate_against, validate_structure};
use crate::types::{Balances, LedgerError, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

/// Validation, batching and application engine
#[derive(Debug)]
pub struct LedgerEngine {
    store: Arc<BalanceStore>,
    queue: AdmissionQueue,
    applier: Applier,
    stats: Arc<Stats>,
}

impl LedgerEngine {
    /// Create an engine over `balances`
    ///
    /// The validator account is created if `balances` lacks it.
    pub fn new(balances: Balances, stats: Arc<Stats>) -> Self {
        let store = Arc::new(BalanceStore::new(balances));
        Self {
            applier: Applier::new(Arc::clone(&store)),
            store,
            queue: AdmissionQueue::new(),
            stats,
        }
    }

    /// Validate a decoded transaction and queue it if admissible
    ///
    /// Structural checks run first and need no lock. The balance-aware check
    /// reads the table under its lock; the result is optimistic because the
    /// table can change before the transaction settles.
    ///
    /// # Returns
    ///
    /// `true` if the transaction was queued. Rejected transactions are
    /// counted as invalid and dropped.
    pub fn ingest(&self, tx: Transaction) -> bool {
        if let Err(e) = validate_structure(&tx) {
            self.reject(&tx, &e);
            return false;
        }

        let admission = self.store.read(|balances| validate_against(&tx, balances));
        if let Err(e) = admission {
            self.reject(&tx, &e);
            return false;
        }

        self.stats.record_received();
        info!(payer = %tx.fee.payer, fee = tx.fee.amount, "Queued transaction");
        self.queue.push(tx);
        true
    }

    fn reject(&self, tx: &Transaction, error: &LedgerError) {
        self.stats.record_rejected();
        warn!(payer = %tx.fee.payer, error = %error, "Rejected transaction");
    }

    /// Count a datagram that never decoded into a transaction
    pub fn record_undecodable(&self) {
        self.stats.record_rejected();
    }

    /// Pull the next conflict-free round from the admission queue
    pub fn extract_round(&self, max_size: usize) -> Vec<Transaction> {
        self.queue.extract_round(max_size)
    }

    /// Apply one transaction under the balance lock
    pub fn apply(&self, tx: &Transaction) -> ApplyOutcome {
        self.applier.apply(tx)
    }

    /// Apply every transaction of a round in order
    ///
    /// Each application takes the balance lock separately; the scheduler is
    /// the only caller, so rounds never overlap.
    pub fn apply_round(&self, round: &[Transaction]) -> RoundTally {
        let mut tally = RoundTally::default();

        for tx in round {
            let outcome = self.apply(tx);
            if outcome.fee_charged() {
                tally.fees = tally.fees.saturating_add(tx.fee.amount);
            }
            match outcome {
                ApplyOutcome::FullyApplied => tally.fully_applied += 1,
                ApplyOutcome::FeeOnlyApplied { .. } => tally.fee_only += 1,
                ApplyOutcome::Failed(_) => tally.failed += 1,
            }
        }

        tally
    }

    /// Point-in-time copy of all balances
    pub fn balances(&self) -> Balances {
        self.store.snapshot()
    }

    /// Current balance of one account
    pub fn balance(&self, account: &str) -> i64 {
        self.store.balance(account)
    }

    /// Number of transactions waiting for a round
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Counters shared with the reporter
    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fee, Instruction, VALIDATOR_ACCOUNT};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn engine() -> LedgerEngine {
        LedgerEngine::new(
            Balances::from([("alice", 100), ("bob", 50), ("carol", 0)]),
            Arc::new(Stats::new(Utc::now())),
        )
    }

    fn transfer(payer: &str, from: &str, to: &str, amount: i64) -> Transaction {
        Transaction::new(
            Fee::new(payer, 1),
            vec![Instruction::direct(from, -amount), Instruction::direct(to, amount)],
        )
    }

    #[rstest]
    fn test_new_creates_validator_account(engine: LedgerEngine) {
        assert_eq!(engine.balances().get(VALIDATOR_ACCOUNT), Some(0));
    }

    #[rstest]
    fn test_ingest_queues_admissible_transaction(engine: LedgerEngine) {
        assert!(engine.ingest(transfer("alice", "alice", "bob", 10)));

        assert_eq!(engine.pending_len(), 1);
        let stats = engine.stats().snapshot();
        assert_eq!(stats.total_received, 1);
        assert_eq!(stats.total_invalid, 0);
    }

    #[rstest]
    #[case::structural(Transaction::new(Fee::new("alice", 0), vec![Instruction::direct("bob", 0)]))]
    #[case::unaffordable_fee(transfer("carol", "alice", "bob", 1))]
    #[case::overdraft(transfer("bob", "bob", "carol", 51))]
    #[case::not_conserved(Transaction::new(
        Fee::new("alice", 1),
        vec![Instruction::direct("alice", -10), Instruction::direct("bob", 3), Instruction::direct("carol", 8)],
    ))]
    fn test_ingest_rejects_and_counts(engine: LedgerEngine, #[case] tx: Transaction) {
        assert!(!engine.ingest(tx));

        assert_eq!(engine.pending_len(), 0);
        let stats = engine.stats().snapshot();
        assert_eq!(stats.total_received, 1);
        assert_eq!(stats.total_invalid, 1);
    }

    #[rstest]
    fn test_ingest_does_not_touch_balances(engine: LedgerEngine) {
        let before = engine.balances();

        engine.ingest(transfer("alice", "alice", "bob", 10));

        assert_eq!(engine.balances(), before);
    }

    #[rstest]
    fn test_apply_round_tallies_outcomes(engine: LedgerEngine) {
        let round = vec![
            transfer("alice", "alice", "dave", 99), // fee leaves 99, debit 99 fits
            transfer("bob", "bob", "erin", 50),     // fee leaves 49, debit 50 does not
        ];

        let tally = engine.apply_round(&round);

        assert_eq!(tally, RoundTally { fully_applied: 1, fee_only: 1, failed: 0, fees: 2 });
        assert_eq!(engine.balance("alice"), 0);
        assert_eq!(engine.balance("dave"), 99);
        assert_eq!(engine.balance("bob"), 49);
        assert_eq!(engine.balance("erin"), 0);
        assert_eq!(engine.balance(VALIDATOR_ACCOUNT), 2);
    }

    #[test]
    fn test_concurrent_ingest_queues_every_admissible_transaction() {
        let mut balances = Balances::new();
        for i in 0..64 {
            balances.set(&format!("acct{i}"), 10);
        }
        let engine = Arc::new(LedgerEngine::new(balances, Arc::new(Stats::new(Utc::now()))));

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    let from = format!("acct{i}");
                    engine.ingest(transfer(&from, &from, "sink", 5))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(engine.pending_len(), 64);
        // All 64 transactions credit "sink", so each round holds one.
        assert_eq!(engine.extract_round(100).len(), 1);
    }
}
