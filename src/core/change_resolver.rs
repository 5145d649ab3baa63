//! Change resolution
//!
//! Turns a transaction's instructions into per-account deltas. Account
//! reference changes read the *current* balance of the referenced account
//! through a [`BalanceView`], so resolution depends on the table state at the
//! moment it runs.
//!
//! Resolution is pure: it never mutates the balance table. It runs once when a
//! transaction is admitted and again inside the applier under the balance
//! lock; the two results may differ if balances changed in between.

use super::traits::BalanceView;
use crate::types::{AccountId, Change, Instruction, LedgerError, Sign};
use std::collections::BTreeMap;

/// Net per-account deltas of one transaction
///
/// Accounts named by several instructions have their deltas summed. Ordered by
/// account id so validation reports failures deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedChanges {
    deltas: BTreeMap<AccountId, i64>,
    total: i64,
}

impl ResolvedChanges {
    /// Net delta per account
    pub fn deltas(&self) -> &BTreeMap<AccountId, i64> {
        &self.deltas
    }

    /// Net delta for `account`, zero if untouched
    pub fn delta(&self, account: &str) -> i64 {
        self.deltas.get(account).copied().unwrap_or(0)
    }

    /// Sum of every resolved change
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Accounts whose net delta is not zero
    pub fn nonzero(&self) -> impl Iterator<Item = (&str, i64)> {
        self.deltas
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .map(|(account, delta)| (account.as_str(), *delta))
    }
}

/// Resolve one change to a signed amount
///
/// Direct values are returned as is. References read the referenced balance
/// (unknown accounts read as zero) and add or subtract it.
pub fn resolve_change<V: BalanceView + ?Sized>(
    change: &Change,
    view: &V,
) -> Result<i64, LedgerError> {
    match change {
        Change::Direct(value) => Ok(*value),
        Change::Reference { account, sign } => {
            let balance = view.balance_of(account);
            match sign {
                Sign::Plus => Ok(balance),
                Sign::Minus => balance
                    .checked_neg()
                    .ok_or_else(|| LedgerError::arithmetic_overflow("reference", account)),
            }
        }
    }
}

/// Resolve every instruction into net per-account deltas and a total
///
/// Stops at the first instruction that fails and reports its index; no
/// partial result is returned.
pub fn resolve_instructions<V: BalanceView + ?Sized>(
    instructions: &[Instruction],
    view: &V,
) -> Result<ResolvedChanges, LedgerError> {
    let mut resolved = ResolvedChanges::default();

    for (index, instruction) in instructions.iter().enumerate() {
        let value = resolve_change(&instruction.change, view)
            .map_err(|e| LedgerError::instruction_resolution(index, e))?;

        let delta = resolved.deltas.entry(instruction.account.clone()).or_insert(0);
        *delta = delta.checked_add(value).ok_or_else(|| {
            LedgerError::instruction_resolution(
                index,
                LedgerError::arithmetic_overflow("accumulate", &instruction.account),
            )
        })?;
        resolved.total = resolved.total.checked_add(value).ok_or_else(|| {
            LedgerError::instruction_resolution(
                index,
                LedgerError::arithmetic_overflow("total", &instruction.account),
            )
        })?;
    }

    Ok(resolved)
}
