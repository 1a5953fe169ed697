//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so each device family
//! gets an enum with one variant per implementation. Adding a real driver
//! means adding a variant and a match arm.
//!
//! ```
//! use posbridge_hardware::devices::AnyPrinterDevice;
//! use posbridge_hardware::mock::MockPrinter;
//!
//! let (printer, _handle) = MockPrinter::new();
//! let any_printer = AnyPrinterDevice::Mock(printer);
//! ```

use crate::mock::{MockDriverManager, MockPrinter, MockScanner};
use crate::traits::{DriverManager, PrinterDevice, ScannerDevice};
use crate::{Alignment, BarcodeSpec, DeviceInfo, Result, TextFormat};

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyPrinterDevice {
    Mock(MockPrinter),
}

impl PrinterDevice for AnyPrinterDevice {
    async fn status(&mut self) -> Result<i32> {
        match self {
            Self::Mock(device) => device.status().await,
        }
    }

    async fn append_text(&mut self, text: &str, format: &TextFormat) -> Result<()> {
        match self {
            Self::Mock(device) => device.append_text(text, format).await,
        }
    }

    async fn append_qr_code(&mut self, data: &str, size: u32, alignment: Alignment) -> Result<()> {
        match self {
            Self::Mock(device) => device.append_qr_code(data, size, alignment).await,
        }
    }

    async fn append_barcode(&mut self, data: &str, spec: &BarcodeSpec) -> Result<()> {
        match self {
            Self::Mock(device) => device.append_barcode(data, spec).await,
        }
    }

    async fn start_print(&mut self) -> Result<i32> {
        match self {
            Self::Mock(device) => device.start_print().await,
        }
    }

    async fn open_cutter(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.open_cutter().await,
        }
    }

    fn supports_cutter(&self) -> bool {
        match self {
            Self::Mock(device) => device.supports_cutter(),
        }
    }

    fn is_80mm(&self) -> bool {
        match self {
            Self::Mock(device) => device.is_80mm(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    Mock(MockScanner),
}

impl ScannerDevice for AnyScannerDevice {
    async fn set_power(&mut self, on: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_power(on).await,
        }
    }

    async fn set_control(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_control(enabled).await,
        }
    }

    async fn read_scan(&mut self) -> Result<String> {
        match self {
            Self::Mock(device) => device.read_scan().await,
        }
    }

    async fn clear_input(&mut self) -> Result<usize> {
        match self {
            Self::Mock(device) => device.clear_input().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDriverManager {
    Mock(MockDriverManager),
}

impl DriverManager for AnyDriverManager {
    async fn printer(&mut self) -> Result<AnyPrinterDevice> {
        match self {
            Self::Mock(manager) => manager.printer().await,
        }
    }

    async fn scanner(&mut self) -> Result<Option<AnyScannerDevice>> {
        match self {
            Self::Mock(manager) => manager.scanner().await,
        }
    }
}
