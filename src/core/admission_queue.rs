//! Pending transactions and conflict-free round extraction
//!
//! This module provides the `AdmissionQueue`, which buffers admitted
//! transactions and hands out *rounds*: subsets in which no two transactions
//! touch the same account, so every member can settle without depending on
//! another.
//!
//! # Design
//!
//! Round extraction is a greedy single pass over the pending list in arrival
//! order:
//!
//! ```text
//! for tx in pending:
//!     round full?                       -> defer
//!     touched(tx) ∩ claimed ≠ ∅?        -> defer (conflict)
//!     otherwise                         -> admit, claimed ∪= touched(tx)
//! ```
//!
//! Deferred transactions keep their relative order and are retried on the next
//! call. A transaction that keeps colliding with earlier arrivals can be
//! deferred indefinitely; there is no starvation countermeasure.
//!
//! # Thread Safety
//!
//! The pending list has its own lock, held only for an append or for one
//! extraction. Validation happens before [`AdmissionQueue::push`] and never
//! under this lock.

use crate::types::Transaction;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// FIFO buffer of admitted transactions
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    pending: Mutex<VecDeque<Transaction>>,
}

impl AdmissionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Transaction>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an admitted transaction at the tail
    pub fn push(&self, tx: Transaction) {
        self.lock().push_back(tx);
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the pending list in arrival order
    pub fn pending(&self) -> Vec<Transaction> {
        self.lock().iter().cloned().collect()
    }

    /// Remove and return a conflict-free round of at most `max_size` transactions
    ///
    /// # Guarantees
    ///
    /// - No two returned transactions share a touched account
    /// - At most `max_size` transactions are returned
    /// - Returned transactions are in arrival order
    /// - Everything not returned stays pending, in arrival order
    pub fn extract_round(&self, max_size: usize) -> Vec<Transaction> {
        let mut pending = self.lock();
        if pending.is_empty() {
            return Vec::new();
        }

        let mut round = Vec::with_capacity(max_size.min(pending.len()));
        let mut remaining = VecDeque::new();
        let mut claimed: HashSet<String> = HashSet::new();

        for tx in pending.drain(..) {
            if round.len() >= max_size {
                remaining.push_back(tx);
                continue;
            }

            let admitted = {
                let touched = tx.touched_accounts();
                if touched.iter().any(|account| claimed.contains(*account)) {
                    false
                } else {
                    claimed.extend(touched.into_iter().map(str::to_owned));
                    true
                }
            };

            if admitted {
                round.push(tx);
            } else {
                debug!(payer = %tx.fee.payer, "Deferred transaction due to account overlap");
                remaining.push_back(tx);
            }
        }

        *pending = remaining;
        round
    }
}
