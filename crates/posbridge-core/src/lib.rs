//! Shared vocabulary for the posbridge workspace.
//!
//! Holds the RPC error codes surfaced to callers, the device status snapshot
//! and the timing and sizing constants every other crate agrees on.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, ErrorCode, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
