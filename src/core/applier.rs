//! State application
//!
//! This module provides the `Applier`, the only component that mutates the
//! balance table.
//!
//! # Policy
//!
//! Under the balance lock, for each transaction:
//! 1. deduct the fee from the payer and credit the validator account;
//! 2. re-check conservation and non-negativity against the post-fee table;
//! 3. apply the instruction deltas only if re-validation passes.
//!
//! The fee is the cost of a settlement slot, so a transaction whose
//! instructions fail re-validation still pays it. That fee-only outcome is a
//! normal result, reported as [`ApplyOutcome::FeeOnlyApplied`], not an error.

use super::balance_store::BalanceStore;
use super::validator::validate_instructions;
use crate::types::{Balances, LedgerError, Transaction, VALIDATOR_ACCOUNT};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of applying one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Fee charged and every instruction applied
    FullyApplied,

    /// Fee charged, instructions skipped because re-validation failed
    FeeOnlyApplied {
        /// Why the instructions were skipped
        reason: LedgerError,
    },

    /// Nothing applied
    ///
    /// Only arithmetic overflow while moving the fee leads here.
    Failed(LedgerError),
}

impl ApplyOutcome {
    /// Whether the fee was moved to the validator account
    pub fn fee_charged(&self) -> bool {
        !matches!(self, ApplyOutcome::Failed(_))
    }

    /// Whether the instructions were applied
    pub fn is_fully_applied(&self) -> bool {
        matches!(self, ApplyOutcome::FullyApplied)
    }
}

/// Applies transactions to the shared balance store
#[derive(Debug, Clone)]
pub struct Applier {
    store: Arc<BalanceStore>,
}

impl Applier {
    /// Create an applier over `store`
    pub fn new(store: Arc<BalanceStore>) -> Self {
        Self { store }
    }

    /// Apply `tx` with exclusive access to the balance table
    ///
    /// The lock is held for fee deduction, re-validation and instruction
    /// application together, so two applications never interleave.
    pub fn apply(&self, tx: &Transaction) -> ApplyOutcome {
        let outcome = self
            .store
            .with_exclusive(|balances| apply_to(balances, tx));

        match &outcome {
            ApplyOutcome::FullyApplied => info!(
                payer = %tx.fee.payer,
                fee = tx.fee.amount,
                instructions = tx.instructions.len(),
                "Transaction applied"
            ),
            ApplyOutcome::FeeOnlyApplied { reason } => warn!(
                payer = %tx.fee.payer,
                fee = tx.fee.amount,
                %reason,
                "Fee charged, instructions skipped"
            ),
            ApplyOutcome::Failed(e) => error!(
                payer = %tx.fee.payer,
                fee = tx.fee.amount,
                error = %e,
                "Transaction not applied"
            ),
        }

        outcome
    }
}

/// Apply `tx` to an exclusively borrowed table
pub fn apply_to(balances: &mut Balances, tx: &Transaction) -> ApplyOutcome {
    if let Err(e) = charge_fee(balances, tx) {
        return ApplyOutcome::Failed(e);
    }

    let resolved = match validate_instructions(tx, &*balances) {
        Ok(resolved) => resolved,
        Err(reason) => return ApplyOutcome::FeeOnlyApplied { reason },
    };

    // Compute every new balance before writing any of them.
    let updates: Result<Vec<(String, i64)>, LedgerError> = resolved
        .deltas()
        .iter()
        .map(|(account, delta)| {
            balances
                .balance(account)
                .checked_add(*delta)
                .map(|after| (account.clone(), after))
                .ok_or_else(|| LedgerError::arithmetic_overflow("apply", account))
        })
        .collect();

    match updates {
        Ok(updates) => {
            for (account, after) in updates {
                balances.set(&account, after);
            }
            ApplyOutcome::FullyApplied
        }
        Err(reason) => ApplyOutcome::FeeOnlyApplied { reason },
    }
}

/// Move the fee from the payer to the validator account
///
/// Neither balance changes unless both new values fit.
fn charge_fee(balances: &mut Balances, tx: &Transaction) -> Result<(), LedgerError> {
    let payer = tx.fee.payer.as_str();
    let fee = tx.fee.amount;

    let payer_after = balances
        .balance(payer)
        .checked_sub(fee)
        .ok_or_else(|| LedgerError::arithmetic_overflow("fee debit", payer))?;
    let validator_before = if payer == VALIDATOR_ACCOUNT {
        payer_after
    } else {
        balances.balance(VALIDATOR_ACCOUNT)
    };
    let validator_after = validator_before
        .checked_add(fee)
        .ok_or_else(|| LedgerError::arithmetic_overflow("fee credit", VALIDATOR_ACCOUNT))?;

    balances.set(payer, payer_after);
    balances.set(VALIDATOR_ACCOUNT, validator_after);
    Ok(())
}
