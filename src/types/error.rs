//! Error types for the ledger validator
//!
//! This module defines every error that can occur while decoding, validating,
//! applying, settling or persisting transactions.
//!
//! # Error Categories
//!
//! - **Decoding Errors**: malformed JSON, malformed `change` values, bad signs
//! - **Admission Errors**: structural problems, unaffordable fees, conservation
//!   violations, balances that would go negative
//! - **Arithmetic Errors**: overflow while resolving or applying deltas
//! - **Collaborator Errors**: settlement transport, snapshot persistence, I/O
//!
//! Admission errors found at apply time are not propagated: the applier turns
//! them into a fee-only outcome (see [`crate::core::ApplyOutcome`]).

use thiserror::Error;

/// Main error type for the ledger validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A datagram could not be decoded into a transaction
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure
        message: String,
    },

    /// A `change` value was neither a bare integer nor a well-formed account reference
    #[error("Malformed change: {message}")]
    MalformedChange {
        /// Description of what was wrong with the value
        message: String,
    },

    /// A transaction failed structural prevalidation
    ///
    /// Raised before the balance table is consulted. The transaction is
    /// rejected at ingestion and never queued.
    #[error("Invalid transaction structure: {reason}")]
    StructuralValidation {
        /// Which structural rule was broken
        reason: String,
    },

    /// Sign text other than `plus` or `minus`
    #[error("Invalid sign '{sign}': expected 'plus' or 'minus'")]
    InvalidSign {
        /// The offending sign text
        sign: String,
    },

    /// Resolving the instruction at `index` failed
    #[error("Instruction {index} failed: {source}")]
    InstructionResolution {
        /// Zero-based position of the failing instruction
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<LedgerError>,
    },

    /// Instruction deltas of one transaction do not sum to zero
    #[error("Sum of changes must be zero (got {total})")]
    ConservationViolation {
        /// Net sum of all resolved deltas
        total: i64,
    },

    /// Fee payer cannot cover the fee
    #[error("Fee payer {payer} cannot cover fee: balance {balance}, fee {fee}")]
    InsufficientFee {
        /// Fee payer account
        payer: String,
        /// Payer balance at check time
        balance: i64,
        /// Requested fee
        fee: i64,
    },

    /// Applying a delta would drive an account negative
    #[error("Account {account} would go negative: {balance} + ({delta})")]
    InsufficientBalance {
        /// Account that would go negative
        account: String,
        /// Balance at check time
        balance: i64,
        /// Net delta for the account
        delta: i64,
    },

    /// Arithmetic overflow while resolving or applying a change
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account involved
        account: String,
    },

    /// The settlement hand-off failed
    #[error("Settlement transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Saving or loading a balance snapshot failed
    #[error("Snapshot persistence error: {message}")]
    Persistence {
        /// Description of the persistence failure
        message: String,
    },

    /// I/O error on a socket or file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Decode {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(error: reqwest::Error) -> Self {
        LedgerError::Transport {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a StructuralValidation error
    pub fn structural(reason: impl Into<String>) -> Self {
        LedgerError::StructuralValidation {
            reason: reason.into(),
        }
    }

    /// Create a MalformedChange error
    pub fn malformed_change(message: impl Into<String>) -> Self {
        LedgerError::MalformedChange {
            message: message.into(),
        }
    }

    /// Create an InvalidSign error
    pub fn invalid_sign(sign: &str) -> Self {
        LedgerError::InvalidSign {
            sign: sign.to_string(),
        }
    }

    /// Wrap an error with the index of the instruction that produced it
    pub fn instruction_resolution(index: usize, source: LedgerError) -> Self {
        LedgerError::InstructionResolution {
            index,
            source: Box::new(source),
        }
    }

    /// Create an InsufficientFee error
    pub fn insufficient_fee(payer: &str, balance: i64, fee: i64) -> Self {
        LedgerError::InsufficientFee {
            payer: payer.to_string(),
            balance,
            fee,
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account: &str, balance: i64, delta: i64) -> Self {
        LedgerError::InsufficientBalance {
            account: account.to_string(),
            balance,
            delta,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        LedgerError::Persistence {
            message: message.into(),
        }
    }
}
