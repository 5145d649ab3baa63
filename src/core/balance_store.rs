//! Authoritative in-memory balance table
//!
//! This module provides the `BalanceStore` struct, the single source of truth
//! for account balances.
//!
//! # Thread Safety
//!
//! The table sits behind one exclusive lock. The applier holds it for the
//! whole of one transaction application so no reader or writer observes an
//! intermediate state. Admission-time validation takes the same lock briefly
//! for a read-only check.

use crate::types::{Balances, VALIDATOR_ACCOUNT};
use std::sync::{Mutex, MutexGuard};

/// Lock-protected balance table
#[derive(Debug, Default)]
pub struct BalanceStore {
    balances: Mutex<Balances>,
}

impl BalanceStore {
    /// Create a store seeded with `balances`
    ///
    /// The validator account is created with a zero balance if it is missing.
    pub fn new(balances: Balances) -> Self {
        let mut balances = balances;
        if balances.get(VALIDATOR_ACCOUNT).is_none() {
            balances.set(VALIDATOR_ACCOUNT, 0);
        }
        Self {
            balances: Mutex::new(balances),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Balances> {
        // A panic while holding the lock cannot leave a half-applied
        // transaction behind: the applier computes every new value before it
        // writes any of them.
        self.balances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the table
    ///
    /// The lock is held for the whole closure. Never call this from code that
    /// awaits while `f` runs.
    pub fn with_exclusive<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Balances) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Run `f` with read access to the table under the same lock
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Balances) -> R,
    {
        let guard = self.lock();
        f(&guard)
    }

    /// Current balance of `account`, zero when unknown
    pub fn balance(&self, account: &str) -> i64 {
        self.read(|balances| balances.balance(account))
    }

    /// Point-in-time copy of the whole table
    ///
    /// Used for persistence and reporting; it may be stale as soon as it is
    /// returned.
    pub fn snapshot(&self) -> Balances {
        self.read(Balances::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_creates_validator_account() {
        let store = BalanceStore::new(Balances::from([("alice", 10)]));

        assert_eq!(store.snapshot().get(VALIDATOR_ACCOUNT), Some(0));
        assert_eq!(store.balance("alice"), 10);
    }

    #[test]
    fn test_with_exclusive_mutates_table() {
        let store = BalanceStore::new(Balances::from([("alice", 10)]));

        store.with_exclusive(|balances| balances.set("alice", 3));

        assert_eq!(store.balance("alice"), 3);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = BalanceStore::new(Balances::from([("alice", 10)]));
        let before = store.snapshot();

        store.with_exclusive(|balances| balances.set("alice", 0));

        assert_eq!(before.get("alice"), Some(10));
        assert_eq!(store.balance("alice"), 0);
    }

    #[test]
    fn test_concurrent_exclusive_updates_do_not_interleave() {
        let store = Arc::new(BalanceStore::new(Balances::from([("counter", 0)])));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        store.with_exclusive(|balances| {
                            let current = balances.balance("counter");
                            balances.set("counter", current + 1);
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.balance("counter"), 8000);
    }
}
