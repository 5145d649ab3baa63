//! Core business logic module
//!
//! This module contains the validation, batching and state-application core:
//! - `traits` - Read-only balance view shared by resolver and validator
//! - `balance_store` - Authoritative lock-protected balance table
//! - `change_resolver` - Instructions to per-account deltas
//! - `validator` - Structural and balance-aware admission rules
//! - `applier` - Fee deduction and conditional instruction application
//! - `admission_queue` - Pending transactions and conflict-free rounds
//! - `stats` - Process counters
//! - `engine` - Orchestration of all of the above

pub mod admission_queue;
pub mod applier;
pub mod balance_store;
pub mod change_resolver;
pub mod engine;
pub mod stats;
pub mod traits;
pub mod validator;

pub use admission_queue::AdmissionQueue;
pub use applier::{ApplyOutcome, Applier};
pub use balance_store::BalanceStore;
pub use change_resolver::{resolve_change, resolve_instructions, ResolvedChanges};
pub use engine::LedgerEngine;
pub use stats::{RoundTally, Stats, StatsSnapshot};
pub use traits::BalanceView;
pub use validator::{
    validate_against, validate_instructions, validate_structure, validate_transaction,
};
