//! Hardware abstraction for the POS terminal's printer and QR scanner.
//!
//! The bridge talks to devices only through the traits in [`traits`]:
//!
//! - [`PrinterDevice`]: status codes, buffered text/QR/barcode content,
//!   printing and cutting.
//! - [`ScannerDevice`]: power and control lines, a cancel-safe scan read and
//!   a flush of unread input.
//! - [`DriverManager`]: acquires the printer and the optional scanner.
//!
//! All traits use native `async fn` (Rust 1.90, Edition 2024). Since that
//! rules out `dyn` dispatch, the [`devices`] module wraps implementations in
//! enums. The [`mock`] module provides controllable mock devices for tests
//! and for running the bridge without a terminal.
//!
//! ```no_run
//! use posbridge_hardware::mock::MockDriverManager;
//! use posbridge_hardware::{AnyDriverManager, DriverManager, PrinterDevice};
//!
//! # async fn example() -> posbridge_hardware::Result<()> {
//! let (manager, _printer, _scanner) = MockDriverManager::standard();
//! let mut manager = AnyDriverManager::Mock(manager);
//!
//! let mut printer = manager.printer().await?;
//! let code = printer.status().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`PrinterDevice`]: traits::PrinterDevice
//! [`ScannerDevice`]: traits::ScannerDevice
//! [`DriverManager`]: traits::DriverManager

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use devices::{AnyDriverManager, AnyPrinterDevice, AnyScannerDevice};
pub use error::{HardwareError, Result};
pub use traits::{DriverManager, PrinterDevice, ScannerDevice};
pub use types::{Alignment, BarcodeSpec, DeviceInfo, PrintElement, Symbology, TextFormat};
