//! Mock device implementations for testing and development.
//!
//! Each mock comes with a handle that drives it from the outside: setting
//! printer status codes, feeding scans, injecting failures and reading back
//! what reached the device.

pub mod manager;
pub mod printer;
pub mod scanner;

pub use manager::MockDriverManager;
pub use printer::{MockPrinter, MockPrinterConfig, MockPrinterHandle, PrinterOp};
pub use scanner::{MockScanner, MockScannerHandle, ScannerOp};
