//! TCP server exposing a [`PosBridge`] over JSON lines.
//!
//! Every connection gets a reader loop and a writer task. The reader submits
//! each request line to the bridge before reading the next, so requests
//! reach the device in the order they arrived on the wire. Only the wait for
//! the result runs on its own task, so a `scanQRCode` waiting for a code does
//! not hold up later requests. Responses are written as they complete and
//! carry the request id.
//!
//! # Architecture
//!
//! ```text
//! client ──line──> reader ──> PosBridge::submit ──spawn──> Reply::wait ──> mpsc ──> writer ──line──> client
//! ```
//!
//! A line that is not a valid request envelope is answered with id `0` and
//! `INVALID_INPUT`; the connection stays open.
//!
//! # Example
//!
//! ```no_run
//! use posbridge_hardware::AnyDriverManager;
//! use posbridge_hardware::mock::MockDriverManager;
//! use posbridge_network::{RpcServer, RpcServerConfig};
//! use posbridge_session::{BridgeConfig, PosBridge};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (manager, _printer, _scanner) = MockDriverManager::standard();
//! let bridge = PosBridge::start(AnyDriverManager::Mock(manager), BridgeConfig::default());
//!
//! let server = RpcServer::bind(RpcServerConfig::default(), bridge).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use posbridge_core::Error;
use posbridge_protocol::{CodecError, JsonLinesCodec, Response, WireRequest, WireResponse};
use posbridge_session::PosBridge;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Default port of the bridge.
pub const DEFAULT_PORT: u16 = 7100;

/// Responses buffered per connection before request tasks wait on the writer.
const RESPONSE_BUFFER: usize = 64;

/// Configuration for the RPC server
///
/// # Example
///
/// ```
/// use posbridge_network::RpcServerConfig;
///
/// let config = RpcServerConfig {
///     bind_addr: "0.0.0.0:7100".parse().unwrap(),
///     max_connections: 8,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Maximum number of simultaneous connections
    pub max_connections: usize,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            max_connections: 16,
        }
    }
}

/// Errors that can occur while serving RPC connections
#[derive(Debug, Error)]
pub enum RpcServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fatal framing error on a connection
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// JSON-lines RPC server in front of a bridge.
pub struct RpcServer {
    listener: TcpListener,
    bridge: PosBridge,
    config: RpcServerConfig,
    active: Arc<AtomicUsize>,
}

impl RpcServer {
    /// Bind the listener. The server accepts nothing until [`run`](Self::run).
    pub async fn bind(config: RpcServerConfig, bridge: PosBridge) -> Result<Self, RpcServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| RpcServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!(
            addr = %listener.local_addr()?,
            max_connections = config.max_connections,
            "RPC server listening"
        );

        Ok(Self {
            listener,
            bridge,
            config,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, RpcServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<(), RpcServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Connections already being served keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), RpcServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (stream, addr) = tokio::select! {
                () = &mut shutdown => {
                    info!("RPC server stopping");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted?,
            };

            let active = self.active.load(Ordering::Relaxed);
            if active >= self.config.max_connections {
                error!(
                    %addr,
                    max_connections = self.config.max_connections,
                    current_connections = active,
                    "Connection rejected: maximum connections reached"
                );
                drop(stream);
                continue;
            }

            if let Err(e) = stream.set_nodelay(true) {
                warn!(%addr, error = %e, "Failed to set TCP_NODELAY");
            }

            let connection_id = Uuid::new_v4();
            let bridge = self.bridge.clone();
            let guard = ConnectionGuard::new(Arc::clone(&self.active));

            tokio::spawn(async move {
                let _guard = guard;
                let connected_at = Utc::now();
                info!(%connection_id, %addr, "Client connected");

                match serve_connection(stream, bridge, connection_id).await {
                    Ok(()) => info!(
                        %connection_id,
                        uptime_ms = uptime_ms(connected_at),
                        "Client disconnected"
                    ),
                    Err(e) => warn!(%connection_id, error = %e, "Connection closed with error"),
                }
            });
        }
    }
}

/// Read requests from one connection until EOF or a fatal framing error.
async fn serve_connection(
    stream: TcpStream,
    bridge: PosBridge,
    connection_id: Uuid,
) -> Result<(), RpcServerError> {
    let framed = Framed::new(stream, JsonLinesCodec::<WireRequest>::new());
    let (mut sink, mut frames) = framed.split::<WireResponse>();
    let (tx, mut rx) = mpsc::channel::<WireResponse>(RESPONSE_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            trace!(%connection_id, id = response.id, "Writing response");
            if let Err(e) = sink.send(response).await {
                warn!(%connection_id, error = %e, "Failed to write response");
                break;
            }
        }
    });

    let mut result = Ok(());
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(Ok(request)) => {
                let (id, request) = request.into_request();
                debug!(%connection_id, id, method = %request.method, "Request received");

                let reply = bridge.submit(request);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = reply.wait().await;
                    if tx.send(WireResponse::new(id, response)).await.is_err() {
                        debug!(%connection_id, id, "Connection gone before response");
                    }
                });
            }
            Ok(Err(e)) => {
                warn!(%connection_id, error = %e, "Malformed request line");
                let response = Response::from(Error::invalid_input(format!(
                    "Malformed request: {e}"
                )));
                if tx.send(WireResponse::new(0, response)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                error!(%connection_id, error = %e, "Framing error");
                result = Err(e.into());
                break;
            }
        }
    }

    // Pending requests still hold senders; the writer ends after the last one.
    drop(tx);
    if let Err(e) = writer.await {
        warn!(%connection_id, error = %e, "Writer task failed");
    }
    result
}

fn uptime_ms(connected_at: DateTime<Utc>) -> i64 {
    (Utc::now() - connected_at).num_milliseconds()
}

/// Counts a connection as active for as long as it is alive.
struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::Relaxed);
        Self { active }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }
}
