//! Network transport for the POS bridge
//!
//! Requests and responses travel as newline-delimited JSON over TCP, framed
//! by [`JsonLinesCodec`](posbridge_protocol::JsonLinesCodec):
//!
//! ```text
//! -> {"id": 1, "method": "printText", "args": {"text": "Hello"}}
//! <- {"id": 1, "status": "success", "payload": {"success": true, "message": "Text printed successfully"}}
//! ```
//!
//! # Components
//!
//! - **RpcServer**: serves a [`PosBridge`](posbridge_session::PosBridge) to
//!   any number of connections, answering requests concurrently.
//! - **RpcClient**: connects to a server and issues requests.

mod client;
mod server;

pub use client::{RpcClient, RpcClientConfig, RpcClientError, Stage};
pub use server::{DEFAULT_PORT, RpcServer, RpcServerConfig, RpcServerError};
