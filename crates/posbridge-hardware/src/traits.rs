//! Device traits for the terminal's printer and QR scanner.
//!
//! The traits use native `async fn` (Edition 2024), which makes them not
//! object-safe. Dynamic dispatch goes through the enum wrappers in
//! [`devices`](crate::devices) instead of `Box<dyn ...>`.

#![allow(async_fn_in_trait)]

use crate::devices::{AnyPrinterDevice, AnyScannerDevice};
use crate::error::Result;
use crate::types::{Alignment, BarcodeSpec, DeviceInfo, PrintElement, TextFormat};

/// Thermal receipt printer.
///
/// Content is appended to a device-side buffer and committed to paper by
/// [`start_print`](PrinterDevice::start_print). Status and print results are
/// raw driver codes; `0` means OK. Interpreting them is the caller's job.
///
/// # Examples
///
/// ```no_run
/// use posbridge_hardware::traits::PrinterDevice;
/// use posbridge_hardware::types::TextFormat;
/// use posbridge_hardware::error::Result;
///
/// async fn print_line<P: PrinterDevice>(printer: &mut P, line: &str) -> Result<i32> {
///     printer.append_text(line, &TextFormat::new(40).monospace()).await?;
///     printer.start_print().await
/// }
/// ```
pub trait PrinterDevice: Send + Sync {
    /// Query the current status code.
    async fn status(&mut self) -> Result<i32>;

    /// Append a line of text to the print buffer.
    async fn append_text(&mut self, text: &str, format: &TextFormat) -> Result<()>;

    /// Append a square QR code with the given edge length.
    async fn append_qr_code(&mut self, data: &str, size: u32, alignment: Alignment) -> Result<()>;

    /// Append a barcode.
    async fn append_barcode(&mut self, data: &str, spec: &BarcodeSpec) -> Result<()>;

    /// Print the buffer. Returns the driver result code.
    async fn start_print(&mut self) -> Result<i32>;

    /// Fire the paper cutter.
    async fn open_cutter(&mut self) -> Result<()>;

    /// Returns `true` if the printer has an automatic cutter.
    fn supports_cutter(&self) -> bool;

    /// Returns `true` for 80 mm paper, `false` for 58 mm.
    fn is_80mm(&self) -> bool;

    /// Identity of the printer.
    async fn get_info(&self) -> Result<DeviceInfo>;

    /// Append one composed element.
    async fn append(&mut self, element: &PrintElement) -> Result<()> {
        match element {
            PrintElement::Text { text, format } => self.append_text(text, format).await,
            PrintElement::QrCode {
                data,
                size,
                alignment,
            } => self.append_qr_code(data, *size, *alignment).await,
            PrintElement::Barcode { data, spec } => self.append_barcode(data, spec).await,
        }
    }
}

/// Camera or laser QR scanner.
///
/// The scanner is armed by powering it on and enabling its control line;
/// decoded text then arrives through [`read_scan`](ScannerDevice::read_scan).
///
/// # Cancellation
///
/// `read_scan` must be cancel-safe: dropping the future before it completes
/// must not lose a scan. Callers race it against timers in `tokio::select!`.
pub trait ScannerDevice: Send + Sync {
    /// Switch scanner power.
    async fn set_power(&mut self, on: bool) -> Result<()>;

    /// Enable or disable scan capture.
    async fn set_control(&mut self, enabled: bool) -> Result<()>;

    /// Wait for the next decoded scan.
    async fn read_scan(&mut self) -> Result<String>;

    /// Drop decoded input that has not been read yet, returning how many
    /// scans were discarded. Never waits for new input.
    async fn clear_input(&mut self) -> Result<usize>;

    /// Identity of the scanner.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Source of device handles.
///
/// Handles may be requested more than once; every call returns a handle to
/// the same physical device.
pub trait DriverManager: Send + Sync {
    /// Acquire the printer. Fails if the terminal has none.
    async fn printer(&mut self) -> Result<AnyPrinterDevice>;

    /// Acquire the QR scanner, if the terminal has one.
    async fn scanner(&mut self) -> Result<Option<AnyScannerDevice>>;
}
