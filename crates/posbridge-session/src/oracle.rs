//! Interpretation of raw printer status codes.

use posbridge_core::constants::{PRINTER_STATUS_OK, PRINTER_STATUS_PAPER_OUT};
use std::fmt;

/// Semantic printer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrinterStatus {
    Ready,
    OutOfPaper,
    Unknown(i32),
}

impl PrinterStatus {
    pub fn classify(code: i32) -> Self {
        match code {
            PRINTER_STATUS_OK => Self::Ready,
            PRINTER_STATUS_PAPER_OUT => Self::OutOfPaper,
            other => Self::Unknown(other),
        }
    }

    /// The raw driver code this status came from.
    pub fn code(&self) -> i32 {
        match self {
            Self::Ready => PRINTER_STATUS_OK,
            Self::OutOfPaper => PRINTER_STATUS_PAPER_OUT,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_paper_out(&self) -> bool {
        matches!(self, Self::OutOfPaper)
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::OutOfPaper => f.write_str("Out of paper"),
            Self::Unknown(code) => write!(f, "Status code: {code}"),
        }
    }
}
