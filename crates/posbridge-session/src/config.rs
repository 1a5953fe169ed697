//! Bridge configuration.
//!
//! Durations are written in milliseconds when (de)serialized:
//!
//! ```json
//! { "queue_capacity": 64, "post_print_settle": 2000, "scan": { "timeout": 10000 } }
//! ```

use posbridge_core::constants::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_SCAN_TIMEOUT_MS, POST_PRINT_SETTLE_MS,
    SCANNER_POWER_OFF_SETTLE_MS, SCANNER_POWER_ON_SETTLE_MS, SHUTDOWN_DRAIN_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`PosBridge`](crate::PosBridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum number of queued commands before submissions get `BUSY`.
    pub queue_capacity: usize,

    /// How long shutdown waits for the worker before aborting it.
    #[serde(with = "duration_ms")]
    pub shutdown_drain: Duration,

    /// Pause after a receipt print before reading the final status.
    #[serde(with = "duration_ms")]
    pub post_print_settle: Duration,

    pub scan: ScanConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_drain: Duration::from_millis(SHUTDOWN_DRAIN_MS),
            post_print_settle: Duration::from_millis(POST_PRINT_SETTLE_MS),
            scan: ScanConfig::default(),
        }
    }
}

/// Timing of a single-shot QR scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Time allowed for a code to be presented once the scanner is armed.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,

    #[serde(with = "duration_ms")]
    pub power_off_settle: Duration,

    #[serde(with = "duration_ms")]
    pub power_on_settle: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            power_off_settle: Duration::from_millis(SCANNER_POWER_OFF_SETTLE_MS),
            power_on_settle: Duration::from_millis(SCANNER_POWER_ON_SETTLE_MS),
        }
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
