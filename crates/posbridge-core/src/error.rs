use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes surfaced across the RPC boundary.
///
/// The serialized form is the SCREAMING_SNAKE_CASE name callers match on,
/// e.g. `DEVICE_NOT_INITIALIZED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DeviceNotInitialized,
    DeviceNotOpened,
    InitError,
    OpenError,
    CloseError,
    InfoError,
    InvalidInput,
    PrintError,
    CutError,
    StatusError,
    NotSupported,
    /// Command queue is full.
    Busy,
    /// Bridge has been torn down.
    Shutdown,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DeviceNotInitialized => "DEVICE_NOT_INITIALIZED",
            ErrorCode::DeviceNotOpened => "DEVICE_NOT_OPENED",
            ErrorCode::InitError => "INIT_ERROR",
            ErrorCode::OpenError => "OPEN_ERROR",
            ErrorCode::CloseError => "CLOSE_ERROR",
            ErrorCode::InfoError => "INFO_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::PrintError => "PRINT_ERROR",
            ErrorCode::CutError => "CUT_ERROR",
            ErrorCode::StatusError => "STATUS_ERROR",
            ErrorCode::NotSupported => "NOT_SUPPORTED",
            ErrorCode::Busy => "BUSY",
            ErrorCode::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single bridge command.
///
/// Every variant maps to exactly one [`ErrorCode`]; the `Display` output is
/// the message half of the `(code, message)` pair returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Precondition errors
    #[error("Device must be initialized first")]
    NotInitialized,

    #[error("Device must be opened first")]
    NotOpened,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotSupported(String),

    // Queue errors
    #[error("Command queue is full ({capacity} pending)")]
    Busy { capacity: usize },

    #[error("Bridge is shut down")]
    Shutdown,

    // Device errors
    #[error("{message}")]
    Device { code: ErrorCode, message: String },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not supported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create a device-side error carrying its own code.
    pub fn device(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Device {
            code,
            message: message.into(),
        }
    }

    /// The RPC error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotInitialized => ErrorCode::DeviceNotInitialized,
            Error::NotOpened => ErrorCode::DeviceNotOpened,
            Error::InvalidInput(_) => ErrorCode::InvalidInput,
            Error::NotSupported(_) => ErrorCode::NotSupported,
            Error::Busy { .. } => ErrorCode::Busy,
            Error::Shutdown => ErrorCode::Shutdown,
            Error::Device { code, .. } => *code,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
