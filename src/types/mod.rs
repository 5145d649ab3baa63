//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers and the balance table
//! - `transaction`: Transactions, instructions and changes
//! - `error`: Error types for the ledger validator

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{AccountId, Balances, VALIDATOR_ACCOUNT};
pub use error::LedgerError;
pub use transaction::{Change, Fee, Instruction, Sign, Transaction};
