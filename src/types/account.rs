//! Account-related types for the ledger validator
//!
//! This module defines account identifiers and the `Balances` table that the
//! balance store guards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Account identifier
pub type AccountId = String;

/// Reserved account that accumulates every fee paid
pub const VALIDATOR_ACCOUNT: &str = "validator";

/// Account balance table
///
/// Maps account identifiers to signed balances. Balances may be negative at
/// rest (a fee deduction alone can cause that); the validated instruction path
/// never introduces a negative balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances {
    accounts: HashMap<AccountId, i64>,
}

impl Balances {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that is guaranteed to contain the validator account
    ///
    /// The validator account is inserted with a zero balance when absent;
    /// an existing balance is kept.
    pub fn with_validator(accounts: HashMap<AccountId, i64>) -> Self {
        let mut balances = Self { accounts };
        balances
            .accounts
            .entry(VALIDATOR_ACCOUNT.to_string())
            .or_insert(0);
        balances
    }

    /// Current balance, if the account exists
    pub fn get(&self, account: &str) -> Option<i64> {
        self.accounts.get(account).copied()
    }

    /// Current balance, treating unknown accounts as zero
    pub fn balance(&self, account: &str) -> i64 {
        self.get(account).unwrap_or(0)
    }

    /// Overwrite the balance of an account, creating it if needed
    pub fn set(&mut self, account: &str, balance: i64) {
        match self.accounts.get_mut(account) {
            Some(existing) => *existing = balance,
            None => {
                self.accounts.insert(account.to_string(), balance);
            }
        }
    }

    /// Number of known accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the table has no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances, widened so it cannot overflow
    pub fn total(&self) -> i128 {
        self.accounts.values().map(|b| i128::from(*b)).sum()
    }

    /// Balances ordered by account id, for deterministic output
    pub fn sorted(&self) -> BTreeMap<&str, i64> {
        self.accounts
            .iter()
            .map(|(account, balance)| (account.as_str(), *balance))
            .collect()
    }
}

impl<const N: usize> From<[(&str, i64); N]> for Balances {
    fn from(entries: [(&str, i64); N]) -> Self {
        Self {
            accounts: entries
                .into_iter()
                .map(|(account, balance)| (account.to_string(), balance))
                .collect(),
        }
    }
}
