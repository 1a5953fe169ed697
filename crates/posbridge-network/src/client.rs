//! TCP client for the JSON-lines RPC transport.
//!
//! Used by point-of-sale front ends and by the integration tests. The client
//! sends one request at a time through [`call`](RpcClient::call), or lets
//! the caller pipeline requests with [`send`](RpcClient::send) and
//! [`recv`](RpcClient::recv) and match responses by id.
//!
//! # Example Usage
//!
//! ```no_run
//! use posbridge_network::{RpcClient, RpcClientConfig};
//! use posbridge_protocol::Request;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = RpcClient::new(RpcClientConfig::default());
//! client.connect().await?;
//!
//! client.call(Request::new("initializeDevice")).await?;
//! client.call(Request::new("openDevice")).await?;
//! let response = client
//!     .call(Request::new("printText").arg("text", "Hello"))
//!     .await?;
//! println!("{response:?}");
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Timeout Handling
//!
//! Connect, send and receive each have the configured timeout. The default
//! is long enough for a full QR scan to come back.

use crate::server::DEFAULT_PORT;
use futures::{SinkExt, StreamExt};
use posbridge_protocol::{CodecError, JsonLinesCodec, Request, Response, WireRequest, WireResponse};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace, warn};

/// Configuration for the RPC client
///
/// # Example
///
/// ```
/// use posbridge_network::RpcClientConfig;
/// use std::time::Duration;
///
/// let config = RpcClientConfig {
///     server_addr: "127.0.0.1:7100".parse().unwrap(),
///     timeout: Duration::from_millis(5000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Server address to connect to
    pub server_addr: SocketAddr,

    /// Timeout for each I/O operation (connect, send, recv)
    pub timeout: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            timeout: Duration::from_millis(15_000),
        }
    }
}

/// Which leg of a call ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Send,
    Receive,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Send => "send",
            Self::Receive => "receive",
        })
    }
}

/// Failures talking to the bridge.
#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("Not connected to the bridge")]
    NotConnected,

    #[error("Bridge did not answer {stage} within {timeout_ms}ms")]
    Timeout { stage: Stage, timeout_ms: u64 },

    /// The bridge closed the socket.
    #[error("Bridge closed the connection")]
    Closed,

    /// The bridge sent a line that is not a response envelope.
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Line framing failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON-lines RPC client.
pub struct RpcClient {
    server_addr: SocketAddr,
    framed: Option<Framed<TcpStream, JsonLinesCodec<WireResponse>>>,
    timeout: Duration,
    next_id: u64,
}

impl RpcClient {
    /// Create a client. It is not connected until [`connect`](Self::connect).
    ///
    /// ```
    /// use posbridge_network::{RpcClient, RpcClientConfig};
    ///
    /// let client = RpcClient::new(RpcClientConfig::default());
    /// assert!(!client.is_connected());
    /// ```
    pub fn new(config: RpcClientConfig) -> Self {
        debug!(server = %config.server_addr, "Creating RPC client");

        Self {
            server_addr: config.server_addr,
            framed: None,
            timeout: config.timeout,
            next_id: 1,
        }
    }

    /// Connect to the bridge.
    pub async fn connect(&mut self) -> Result<(), RpcClientError> {
        info!(server = %self.server_addr, "Connecting to bridge");

        let stream =
            match tokio::time::timeout(self.timeout, TcpStream::connect(self.server_addr)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    error!(error = %e, "Connection failed");
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(timeout_ms = self.timeout_ms(), "Connection timeout");
                    return Err(self.timed_out(Stage::Connect));
                }
            };

        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "Failed to set TCP_NODELAY");
        }

        self.framed = Some(Framed::new(stream, JsonLinesCodec::new()));
        debug!("Client connected");
        Ok(())
    }

    /// Send a request under a fresh id and return that id.
    pub async fn send(&mut self, request: Request) -> Result<u64, RpcClientError> {
        let id = self.next_id;
        self.next_id += 1;
        let timeout = self.timeout;
        let timeout_ms = self.timeout_ms();

        trace!(id, method = %request.method, "Sending request");
        let framed = self.framed.as_mut().ok_or(RpcClientError::NotConnected)?;

        match tokio::time::timeout(timeout, framed.send(WireRequest::new(id, request))).await {
            Ok(Ok(())) => Ok(id),
            Ok(Err(e)) => {
                error!(error = %e, "Failed to send request");
                Err(e.into())
            }
            Err(_) => {
                warn!(timeout_ms, "Send timeout");
                Err(RpcClientError::Timeout {
                    stage: Stage::Send,
                    timeout_ms,
                })
            }
        }
    }

    /// Receive the next response, whichever request it answers.
    pub async fn recv(&mut self) -> Result<WireResponse, RpcClientError> {
        let timeout = self.timeout;
        let timeout_ms = self.timeout_ms();
        let framed = self.framed.as_mut().ok_or(RpcClientError::NotConnected)?;

        match tokio::time::timeout(timeout, framed.next()).await {
            Ok(Some(Ok(Ok(response)))) => {
                trace!(id = response.id, "Received response");
                Ok(response)
            }
            Ok(Some(Ok(Err(e)))) => {
                error!(error = %e, "Failed to parse response");
                Err(e.into())
            }
            Ok(Some(Err(e))) => {
                error!(error = %e, "Framing error");
                Err(e.into())
            }
            Ok(None) => {
                warn!("Connection closed by server");
                Err(RpcClientError::Closed)
            }
            Err(_) => {
                warn!(timeout_ms, "Receive timeout");
                Err(RpcClientError::Timeout {
                    stage: Stage::Receive,
                    timeout_ms,
                })
            }
        }
    }

    /// Send a request and wait for its response.
    ///
    /// Responses to other ids arriving first are logged and skipped.
    pub async fn call(&mut self, request: Request) -> Result<Response, RpcClientError> {
        let id = self.send(request).await?;
        loop {
            let response = self.recv().await?;
            if response.id == id {
                return Ok(response.response);
            }
            debug!(expected = id, got = response.id, "Skipping unrelated response");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Close the connection. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), RpcClientError> {
        let Some(mut framed) = self.framed.take() else {
            return Ok(());
        };
        info!(server = %self.server_addr, "Closing connection");

        let grace = Duration::from_millis(500);
        match tokio::time::timeout(grace, SinkExt::<WireRequest>::flush(&mut framed)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Error flushing during close"),
            Err(_) => warn!("Flush timeout during close"),
        }

        let mut stream = framed.into_inner();
        match tokio::time::timeout(grace, stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Error during shutdown"),
            Err(_) => warn!("Shutdown timeout during close"),
        }

        debug!("Connection closed");
        Ok(())
    }

    fn timed_out(&self, stage: Stage) -> RpcClientError {
        RpcClientError::Timeout {
            stage,
            timeout_ms: self.timeout_ms(),
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RpcClientConfig::default();
        assert_eq!(config.server_addr.port(), DEFAULT_PORT);
        assert_eq!(config.timeout.as_millis(), 15_000);
    }

    #[tokio::test]
    async fn test_send_without_connect() {
        let mut client = RpcClient::new(RpcClientConfig::default());

        let result = client.send(Request::new("getDeviceStatus")).await;
        assert!(matches!(result, Err(RpcClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_recv_without_connect() {
        let mut client = RpcClient::new(RpcClientConfig::default());

        let result = client.recv().await;
        assert!(matches!(result, Err(RpcClientError::NotConnected)));
    }

    #[test]
    fn test_timeout_names_the_stage() {
        let err = RpcClient::new(RpcClientConfig::default()).timed_out(Stage::Connect);
        assert_eq!(err.to_string(), "Bridge did not answer connect within 15000ms");
    }

    #[tokio::test]
    async fn test_multiple_close_calls() {
        let mut client = RpcClient::new(RpcClientConfig::default());

        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(!client.is_connected());
    }
}
