//! Periodic stats log line

use super::clock::{Clock, Ticker};
use crate::core::{Stats, StatsSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Log the counters on every tick until the ticker is exhausted
pub async fn run_stats_reporter<T: Ticker>(stats: Arc<Stats>, clock: Arc<dyn Clock>, mut ticker: T) {
    while ticker.tick().await {
        report(&stats.snapshot(), clock.now());
    }
}

fn report(stats: &StatsSnapshot, now: DateTime<Utc>) {
    info!(
        received = stats.total_received,
        processed = stats.total_processed,
        invalid = stats.total_invalid,
        fees = stats.total_fees_paid,
        fee_only = stats.fee_only,
        rounds = stats.rounds,
        rate = %format!("{:.2}/sec", fee_rate(stats, now)),
        "Stats"
    );
}

/// Fees earned per second since the last processed round
///
/// Before any round settles this measures from process start.
pub fn fee_rate(stats: &StatsSnapshot, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - stats.last_processed_at).num_milliseconds();
    if elapsed <= 0 {
        return 0.0;
    }
    stats.total_fees_paid as f64 * 1000.0 / elapsed as f64
}
