//! Long-running services
//!
//! - `clock` - Injectable time and tick sources
//! - `scheduler` - Periodic round settlement
//! - `reporter` - Periodic stats log line

pub mod clock;
pub mod reporter;
pub mod scheduler;

pub use clock::{Clock, CountedTicker, IntervalTicker, ManualClock, SystemClock, Ticker};
pub use reporter::{fee_rate, run_stats_reporter};
pub use scheduler::{BatchScheduler, SchedulerConfig, TickReport};
