//! Device codes, timings and size limits.
//!
//! The printer status codes are the values the vendor driver reports from its
//! status query. Timings are the defaults for `ScanConfig` and
//! `BridgeConfig` in the session crate; they can be overridden there.

// ============================================================================
// Printer Status Codes
// ============================================================================

/// Status/result code the driver reports when the printer is ready or a
/// print job was accepted.
pub const PRINTER_STATUS_OK: i32 = 0;

/// Status code the driver reports when the paper roll is empty.
pub const PRINTER_STATUS_PAPER_OUT: i32 = -1001;

// ============================================================================
// QR Code Sizing
// ============================================================================

/// Smallest QR code edge accepted by the printer, in dots.
pub const MIN_QR_SIZE: u32 = 100;

/// Largest QR code edge accepted by the printer, in dots.
pub const MAX_QR_SIZE: u32 = 600;

/// QR code edge used when the caller gives none.
pub const DEFAULT_QR_SIZE: u32 = 200;

// ============================================================================
// Barcode Layout
// ============================================================================

/// Barcode width in dots.
pub const BARCODE_WIDTH: u32 = 360;

/// Barcode height in dots.
pub const BARCODE_HEIGHT: u32 = 100;

// ============================================================================
// Timings (milliseconds)
// ============================================================================

/// How long a scan session waits for input before timing out.
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 10_000;

/// Settle delay after powering the scanner off while arming.
pub const SCANNER_POWER_OFF_SETTLE_MS: u64 = 10;

/// Settle delay after powering the scanner on while arming.
pub const SCANNER_POWER_ON_SETTLE_MS: u64 = 100;

/// Delay after starting a receipt print so the mechanism finishes feeding.
pub const POST_PRINT_SETTLE_MS: u64 = 2_000;

/// Time the worker is given to drain queued commands on shutdown.
pub const SHUTDOWN_DRAIN_MS: u64 = 1_000;

// ============================================================================
// Queue Limits
// ============================================================================

/// Default number of commands that may wait for the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

// ============================================================================
// Device Identity
// ============================================================================

/// Model string reported by `getDeviceInfo`.
pub const DEVICE_MODEL: &str = "ZCS POS Terminal";

/// Vendor SDK version reported by `getDeviceInfo`.
pub const SDK_VERSION: &str = "1.8.1+";

/// Prefix for generated serial numbers.
pub const SERIAL_NUMBER_PREFIX: &str = "ZCS_";

/// Store name printed when a receipt does not carry one.
pub const DEFAULT_STORE_NAME: &str = "Blankets And Wine";

/// Currency prefix for receipt amounts.
pub const RECEIPT_CURRENCY: &str = "Kshs";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_bounds_are_ordered() {
        assert!(MIN_QR_SIZE < DEFAULT_QR_SIZE);
        assert!(DEFAULT_QR_SIZE < MAX_QR_SIZE);
    }

    #[test]
    fn test_status_codes_are_distinct() {
        assert_ne!(PRINTER_STATUS_OK, PRINTER_STATUS_PAPER_OUT);
    }

    #[test]
    fn test_settle_delays_fit_inside_scan_timeout() {
        assert!(SCANNER_POWER_OFF_SETTLE_MS + SCANNER_POWER_ON_SETTLE_MS < DEFAULT_SCAN_TIMEOUT_MS);
    }
}
