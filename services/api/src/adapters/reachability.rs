//! services/api/src/adapters/reachability.rs
//!
//! Implements the `NetworkProbe` port with a timeout-bounded HTTP request.
//! Any response at all, error statuses included, counts as reachable.

use async_trait::async_trait;
use std::time::Duration;
use story_core::ports::NetworkProbe;
use tracing::debug;

#[derive(Clone)]
pub struct HttpReachability {
    client: reqwest::Client,
    url: String,
}

impl HttpReachability {
    pub fn new(url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NetworkProbe for HttpReachability {
    async fn is_offline(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(response) => {
                debug!(url = %self.url, status = %response.status(), "Story provider reachable");
                false
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "Story provider unreachable");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_is_offline() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe =
            HttpReachability::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap();
        assert!(probe.is_offline().await);
    }

    #[tokio::test]
    async fn any_http_answer_is_online() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let probe =
            HttpReachability::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        assert!(!probe.is_offline().await);
    }
}
