//! Ledger Validator Library
//! # Overview
//!
//! This library implements a single-node validator for an account-balance
//! ledger. Transactions arrive as JSON datagrams, are validated against the
//! current balances, grouped into conflict-free rounds, handed to a settlement
//! endpoint, applied locally, and persisted as balance snapshots.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Balances, Transaction, Change, LedgerError)
//! - [`core`] - Business logic components:
//!   - [`core::change_resolver`] - Instruction changes to per-account deltas
//!   - [`core::validator`] - Structural and balance-aware admission rules
//!   - [`core::applier`] - Fee deduction and conditional instruction application
//!   - [`core::admission_queue`] - Pending transactions and round extraction
//!   - [`core::engine`] - Orchestration of the above
//! - [`io`] - UDP ingestion, settlement transport and snapshot files
//! - [`service`] - Batch scheduler and stats reporter
//! - [`config`] / [`cli`] - Runtime configuration and argument parsing
//!
//! # Transaction Semantics
//!
//! - The **fee** is paid by `fee.payer` to the validator account and is
//!   charged whenever a transaction is applied.
//! - **Instructions** change balances by a literal amount or by the current
//!   balance of a referenced account. Their deltas must sum to zero.
//! - If the instructions would drive any account negative at apply time,
//!   only the fee is charged.
//! - No two transactions in one round touch the same account.

pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod service;
pub mod types;

pub use config::ValidatorConfig;
pub use core::{ApplyOutcome, LedgerEngine, Stats};
pub use io::{load_snapshot, BatchSink, FileSnapshotStore, HttpBatchSink, SnapshotStore, UdpListener};
pub use service::{BatchScheduler, SchedulerConfig};
pub use types::{
    AccountId, Balances, Change, Fee, Instruction, LedgerError, Sign, Transaction,
    VALIDATOR_ACCOUNT,
};
