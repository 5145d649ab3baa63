//! Core traits for reading balances
//!
//! The change resolver and validator only ever need to read balances. They
//! take a `BalanceView` so the same code runs against the locked table inside
//! the applier and against plain maps in tests.

use crate::types::Balances;
use std::collections::HashMap;

/// Read-only view of account balances
pub trait BalanceView {
    /// Current balance of `account`; unknown accounts read as zero
    fn balance_of(&self, account: &str) -> i64;
}

impl BalanceView for Balances {
    fn balance_of(&self, account: &str) -> i64 {
        self.balance(account)
    }
}

impl BalanceView for HashMap<String, i64> {
    fn balance_of(&self, account: &str) -> i64 {
        self.get(account).copied().unwrap_or(0)
    }
}

impl<T: BalanceView + ?Sized> BalanceView for &T {
    fn balance_of(&self, account: &str) -> i64 {
        (**self).balance_of(account)
    }
}
