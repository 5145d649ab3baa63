//! Transaction admission rules
//!
//! Two layers of checks:
//!
//! - [`validate_structure`] needs no balances and runs before a transaction
//!   is queued.
//! - [`validate_against`] checks fee affordability, conservation and
//!   non-negativity against a balance view. At admission time this is an
//!   optimistic pre-check.
//! - [`validate_instructions`] is the conservation and non-negativity part on
//!   its own. The applier repeats it under the balance lock, after the fee is
//!   taken, and that repeat decides whether instructions execute.

use super::change_resolver::{resolve_instructions, ResolvedChanges};
use super::traits::BalanceView;
use crate::types::{LedgerError, Transaction};

/// Structural prevalidation
///
/// Rejects a transaction with an empty fee payer, a non-positive fee, no
/// instructions, or an instruction with an empty account.
pub fn validate_structure(tx: &Transaction) -> Result<(), LedgerError> {
    if tx.fee.payer.is_empty() {
        return Err(LedgerError::structural("fee payer cannot be empty"));
    }
    if tx.fee.amount <= 0 {
        return Err(LedgerError::structural(format!(
            "fee amount must be positive, got: {}",
            tx.fee.amount
        )));
    }
    if tx.instructions.is_empty() {
        return Err(LedgerError::structural(
            "transaction must have at least one instruction",
        ));
    }
    if let Some(index) = tx.instructions.iter().position(|i| i.account.is_empty()) {
        return Err(LedgerError::structural(format!(
            "instruction {index}: account cannot be empty"
        )));
    }
    Ok(())
}

/// Balance-aware validation
///
/// All of the following must hold:
/// 1. the fee payer's balance covers the fee;
/// 2. the resolved instruction deltas sum to zero;
/// 3. no account with a nonzero delta would end below zero.
///
/// # Returns
///
/// The resolved deltas, so callers that go on to apply them do not resolve
/// twice against the same state.
pub fn validate_against<V: BalanceView + ?Sized>(
    tx: &Transaction,
    view: &V,
) -> Result<ResolvedChanges, LedgerError> {
    let payer_balance = view.balance_of(&tx.fee.payer);
    if payer_balance < tx.fee.amount {
        return Err(LedgerError::insufficient_fee(
            &tx.fee.payer,
            payer_balance,
            tx.fee.amount,
        ));
    }

    validate_instructions(tx, view)
}

/// Conservation and non-negativity of the instruction deltas
///
/// The part of [`validate_against`] the applier repeats once the fee has
/// already been taken.
pub fn validate_instructions<V: BalanceView + ?Sized>(
    tx: &Transaction,
    view: &V,
) -> Result<ResolvedChanges, LedgerError> {
    let resolved = resolve_instructions(&tx.instructions, view)?;

    if resolved.total() != 0 {
        return Err(LedgerError::ConservationViolation {
            total: resolved.total(),
        });
    }

    for (account, delta) in resolved.nonzero() {
        let balance = view.balance_of(account);
        let after = balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::arithmetic_overflow("validate", account))?;
        if after < 0 {
            return Err(LedgerError::insufficient_balance(account, balance, delta));
        }
    }

    Ok(resolved)
}

/// Whether `tx` is admissible against `view`
pub fn validate_transaction<V: BalanceView + ?Sized>(tx: &Transaction, view: &V) -> bool {
    validate_against(tx, view).is_ok()
}
