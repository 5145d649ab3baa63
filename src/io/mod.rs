//! I/O module
//!
//! Everything that crosses the process boundary.
//!
//! # Components
//!
//! - `codec` - JSON wire format for transactions
//! - `udp_listener` - Datagram receive loop feeding the engine
//! - `batch_sink` - Settlement transport for extracted rounds
//! - `snapshot` - Initial balance load and per-round snapshot files

pub mod batch_sink;
pub mod codec;
pub mod snapshot;
pub mod udp_listener;

pub use batch_sink::{BatchSink, HttpBatchSink, SinkReceipt};
pub use codec::{decode_transaction, encode_transaction, may_be_truncated, MAX_DATAGRAM_SIZE};
pub use snapshot::{load_snapshot, snapshot_file_name, FileSnapshotStore, SnapshotStore};
pub use udp_listener::UdpListener;
