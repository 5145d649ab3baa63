//! Benchmark suite for round extraction and settlement
//!
//! Uses the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Workloads
//!
//! - `disjoint` - every transaction touches its own pair of accounts, so one
//!   round takes as many as the round size allows
//! - `hot_account` - every transaction credits the same account, so each
//!   round holds exactly one transaction and the rest is deferred

use chrono::Utc;
use ledger_validator::core::{AdmissionQueue, LedgerEngine, Stats};
use ledger_validator::types::{Balances, Fee, Instruction, Transaction};
use std::sync::Arc;

fn main() {
    divan::main();
}

fn transfer(from: &str, to: &str) -> Transaction {
    Transaction::new(
        Fee::new(from, 1),
        vec![Instruction::direct(from, -5), Instruction::direct(to, 5)],
    )
}

fn disjoint(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| transfer(&format!("payer{i}"), &format!("payee{i}")))
        .collect()
}

fn hot_account(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| transfer(&format!("payer{i}"), "merchant"))
        .collect()
}

fn queue_of(txs: Vec<Transaction>) -> AdmissionQueue {
    let queue = AdmissionQueue::new();
    for tx in txs {
        queue.push(tx);
    }
    queue
}

/// Extract one 100-transaction round from a queue of disjoint transactions
#[divan::bench(args = [100, 1_000, 10_000])]
fn extract_disjoint(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| queue_of(disjoint(count)))
        .bench_local_values(|queue| queue.extract_round(100));
}

/// Extract one round where every transaction conflicts on one account
#[divan::bench(args = [100, 1_000, 10_000])]
fn extract_hot_account(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| queue_of(hot_account(count)))
        .bench_local_values(|queue| queue.extract_round(100));
}

/// Ingest and settle 1,000 disjoint transactions through the engine
#[divan::bench]
fn ingest_and_apply_disjoint(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| {
            let txs = disjoint(1_000);
            let mut balances = Balances::new();
            for tx in &txs {
                balances.set(&tx.fee.payer, 10);
            }
            (LedgerEngine::new(balances, Arc::new(Stats::new(Utc::now()))), txs)
        })
        .bench_local_values(|(engine, txs)| {
            for tx in txs {
                engine.ingest(tx);
            }
            while engine.pending_len() > 0 {
                let round = engine.extract_round(100);
                engine.apply_round(&round);
            }
            engine
        });
}
