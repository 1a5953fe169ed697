use crate::constants::{DEFAULT_QR_SIZE, MAX_QR_SIZE, MIN_QR_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of the device session flags.
///
/// Published by the worker after every command and read without touching the
/// device. Field names follow the RPC payload of `getDeviceStatus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub initialized: bool,
    pub opened: bool,
    pub ready: bool,
    pub supports_cutter: bool,
    #[serde(rename = "hasQRScanner")]
    pub has_qr_scanner: bool,
    pub scanner_active: bool,
}

impl DeviceStatus {
    /// Build a snapshot, deriving `ready` from the other flags.
    #[must_use]
    pub fn new(
        initialized: bool,
        opened: bool,
        capabilities: Capabilities,
        scanner_active: bool,
    ) -> Self {
        Self {
            initialized,
            opened,
            ready: initialized && opened,
            supports_cutter: capabilities.supports_cutter,
            has_qr_scanner: capabilities.has_qr_scanner,
            scanner_active,
        }
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_cutter: self.supports_cutter,
            has_qr_scanner: self.has_qr_scanner,
        }
    }
}

/// Hardware capabilities discovered during initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub supports_cutter: bool,
    #[serde(rename = "hasQRScanner")]
    pub has_qr_scanner: bool,
}

/// QR code edge length in printer dots, always within
/// [`MIN_QR_SIZE`]..=[`MAX_QR_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QrSize(u32);

impl QrSize {
    /// Clamp a requested size into the printable range.
    ///
    /// Clamping is idempotent: `QrSize::clamped(q.get().into()) == q`.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        let size = requested.clamp(i64::from(MIN_QR_SIZE), i64::from(MAX_QR_SIZE));
        // In range by construction
        QrSize(size as u32)
    }

    #[must_use]
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for QrSize {
    fn default() -> Self {
        QrSize(DEFAULT_QR_SIZE)
    }
}

impl fmt::Display for QrSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
