//! Driver-level failures.
//!
//! These messages reach RPC callers inside `PRINT_ERROR`, `STATUS_ERROR` and
//! the scan outcomes, so `Display` is written for the cashier's screen.

/// Result type alias for driver calls.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// A printer or scanner driver call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// The link to the device went away mid-operation.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The terminal has no such device fitted.
    #[error("{device} not available")]
    NotAvailable { device: String },

    /// The fitted device lacks the capability.
    #[error("{operation} is not supported by this device")]
    Unsupported { operation: String },

    /// The driver reported a failure.
    #[error("Communication error: {message}")]
    Communication { message: String },
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn not_available(device: impl Into<String>) -> Self {
        Self::NotAvailable {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected() {
        let error = HardwareError::disconnected("QR scanner input channel closed");
        assert_eq!(
            error.to_string(),
            "Device disconnected: QR scanner input channel closed"
        );
    }

    #[test]
    fn test_not_available_names_the_device() {
        assert_eq!(
            HardwareError::not_available("Printer").to_string(),
            "Printer not available"
        );
    }

    #[test]
    fn test_unsupported_cutter() {
        assert_eq!(
            HardwareError::unsupported("Paper cutting").to_string(),
            "Paper cutting is not supported by this device"
        );
    }

    #[test]
    fn test_communication_message_is_kept() {
        let error = HardwareError::communication("Print head jammed");
        assert!(matches!(error, HardwareError::Communication { .. }));
        assert_eq!(error.to_string(), "Communication error: Print head jammed");
    }
}
