//! Settlement transport
//!
//! After a round is extracted the scheduler hands it to a [`BatchSink`]. Once
//! the sink has answered the round is applied whatever status it reported.
//! A hand-off that fails outright is logged and the round is dropped, not
//! retried.

use crate::types::{LedgerError, Transaction};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// What the sink reported for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkReceipt {
    /// Transport-level status code
    pub status: u16,
}

impl SinkReceipt {
    /// Whether the sink reported success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Destination for settlement rounds
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Hand one round over for settlement
    ///
    /// # Errors
    ///
    /// [`LedgerError::Transport`] when the round could not be delivered at
    /// all. A delivered round with a non-success status is a receipt, not an
    /// error.
    async fn submit(&self, round: &[Transaction]) -> Result<SinkReceipt, LedgerError>;
}

/// POSTs each round as a JSON array
#[derive(Debug, Clone)]
pub struct HttpBatchSink {
    url: String,
    client: Client,
}

impl HttpBatchSink {
    /// Create a sink posting to `url`, giving up on a request after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Endpoint rounds are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BatchSink for HttpBatchSink {
    async fn submit(&self, round: &[Transaction]) -> Result<SinkReceipt, LedgerError> {
        let response = self.client.post(&self.url).json(round).send().await?;
        Ok(SinkReceipt {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fee, Instruction};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn sample_round() -> Vec<Transaction> {
        vec![
            Transaction::new(
                Fee::new("alice", 1),
                vec![Instruction::direct("alice", -1), Instruction::direct("bob", 1)],
            ),
            Transaction::new(
                Fee::new("carol", 2),
                vec![Instruction::direct("carol", -5), Instruction::direct("dave", 5)],
            ),
        ]
    }

    /// Accept one HTTP request, answer with `status_line`, return the request body
    async fn serve_once(listener: TcpListener, status_line: &'static str) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);

        while request.len() < header_end + content_length {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        String::from_utf8(request[header_end..header_end + content_length].to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_http_sink_posts_round_as_json_array() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "200 OK"));
        let sink = HttpBatchSink::new(url, Duration::from_secs(5)).unwrap();

        let receipt = sink.submit(&sample_round()).await.unwrap();

        assert_eq!(receipt, SinkReceipt { status: 200 });
        assert!(receipt.is_success());
        let body = server.await.unwrap();
        let posted: Vec<Transaction> = serde_json::from_str(&body).unwrap();
        assert_eq!(posted, sample_round());
    }

    #[tokio::test]
    async fn test_http_sink_reports_non_success_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "503 Service Unavailable"));
        let sink = HttpBatchSink::new(url, Duration::from_secs(5)).unwrap();

        let receipt = sink.submit(&sample_round()).await.unwrap();

        assert_eq!(receipt.status, 503);
        assert!(!receipt.is_success());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_sink_unreachable_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let sink = HttpBatchSink::new(url, Duration::from_secs(5)).unwrap();

        let result = sink.submit(&sample_round()).await;

        assert!(matches!(result, Err(LedgerError::Transport { .. })));
    }
}
