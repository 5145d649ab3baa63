//! UDP ingestion
//!
//! One datagram carries one JSON transaction. Each decoded transaction is
//! validated on its own task so a slow admission check never blocks the
//! receive loop.

use super::codec::{decode_transaction, may_be_truncated, MAX_DATAGRAM_SIZE};
use crate::core::LedgerEngine;
use crate::types::LedgerError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{info, info_span, warn, Instrument};

/// Receives transactions and hands them to the engine
#[derive(Debug)]
pub struct UdpListener {
    socket: UdpSocket,
    engine: Arc<LedgerEngine>,
}

impl UdpListener {
    /// Bind to `addr`
    pub async fn bind(
        addr: impl ToSocketAddrs,
        engine: Arc<LedgerEngine>,
    ) -> Result<Self, LedgerError> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket, engine })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, LedgerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive datagrams until the task is cancelled
    ///
    /// Receive errors and undecodable payloads are logged and skipped; they
    /// never stop the loop.
    pub async fn run(self) {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        if let Ok(addr) = self.socket.local_addr() {
            info!(%addr, "Listening for transactions");
        }

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "Failed to receive datagram");
                    continue;
                }
            };

            let payload = &buf[..len];
            let tx = match decode_transaction(payload) {
                Ok(tx) => tx,
                Err(e) if may_be_truncated(len) => {
                    self.engine.record_undecodable();
                    warn!(
                        %peer,
                        size = len,
                        limit = MAX_DATAGRAM_SIZE,
                        error = %e,
                        "Dropped datagram that may have been truncated"
                    );
                    continue;
                }
                Err(e) => {
                    self.engine.record_undecodable();
                    warn!(
                        %peer,
                        error = %e,
                        payload = %String::from_utf8_lossy(payload),
                        "Dropped undecodable datagram"
                    );
                    continue;
                }
            };

            let engine = Arc::clone(&self.engine);
            tokio::spawn(
                async move {
                    engine.ingest(tx);
                }
                .instrument(info_span!("ingest", %peer)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stats;
    use crate::io::codec::encode_transaction;
    use crate::types::{Balances, Fee, Instruction, Transaction};
    use chrono::Utc;
    use std::time::Duration;

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_listener_ingests_and_counts_datagrams() {
        let engine = Arc::new(LedgerEngine::new(
            Balances::from([("alice", 100)]),
            Arc::new(Stats::new(Utc::now())),
        ));
        let listener = UdpListener::bind("127.0.0.1:0", Arc::clone(&engine))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(listener.run());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let tx = Transaction::new(
            Fee::new("alice", 1),
            vec![Instruction::direct("alice", -10), Instruction::direct("bob", 10)],
        );
        client.send_to(&encode_transaction(&tx).unwrap(), addr).await.unwrap();
        client.send_to(b"not json", addr).await.unwrap();

        wait_until(|| engine.stats().snapshot().total_received == 2).await;
        wait_until(|| engine.pending_len() == 1).await;

        let stats = engine.stats().snapshot();
        assert_eq!(stats.total_invalid, 1);
        task.abort();
    }

    #[tokio::test]
    async fn test_oversized_datagram_is_counted_invalid() {
        let engine = Arc::new(LedgerEngine::new(
            Balances::from([("alice", 100)]),
            Arc::new(Stats::new(Utc::now())),
        ));
        let listener = UdpListener::bind("127.0.0.1:0", Arc::clone(&engine))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(listener.run());

        let mut instructions = vec![Instruction::direct("alice", -60)];
        instructions.extend(
            (0..60).map(|i| Instruction::direct(&format!("recipient-account-{i:02}"), 1)),
        );
        let oversized =
            encode_transaction(&Transaction::new(Fee::new("alice", 1), instructions)).unwrap();
        assert!(oversized.len() > MAX_DATAGRAM_SIZE);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&oversized, addr).await.unwrap();

        wait_until(|| engine.stats().snapshot().total_received == 1).await;

        let stats = engine.stats().snapshot();
        assert_eq!(stats.total_invalid, 1);
        assert_eq!(engine.pending_len(), 0);
        task.abort();
    }
}
