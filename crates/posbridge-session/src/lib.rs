//! Command serialization and device sessions for the POS bridge.
//!
//! A [`PosBridge`] owns one worker task. The worker holds the
//! [`DeviceSession`] and the [`ScanSession`] and runs every device command
//! strictly in submission order; callers only validate their request,
//! enqueue it and await the result. Session flags are published after each
//! command so [`PosBridge::status`] never touches the device.
//!
//! QR scans are single-shot: the `scanQRCode` caller is held until a code
//! arrives, the scan times out or it is cancelled by `stopQRScan` or
//! `closeDevice`.

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod oracle;
pub mod receipt;
pub mod scan;
pub mod serializer;
pub mod session;
pub mod state_machine;
pub mod worker;

pub use bridge::{PosBridge, Reply};
pub use config::{BridgeConfig, ScanConfig};
pub use dispatcher::{PendingResponse, ResponseSlot, response_slot};
pub use oracle::PrinterStatus;
pub use scan::ScanSession;
pub use serializer::{Command, CommandQueue, Job};
pub use session::DeviceSession;
pub use state_machine::{InvalidTransition, ScanState, ScanStateMachine, StateTransition};
