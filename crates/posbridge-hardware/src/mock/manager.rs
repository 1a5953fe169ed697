//! Mock driver manager handing out mock devices.

use super::{MockPrinter, MockPrinterHandle, MockScanner, MockScannerHandle};
use crate::devices::{AnyPrinterDevice, AnyScannerDevice};
use crate::traits::DriverManager;
use crate::{HardwareError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Driver manager over mock devices.
///
/// Every acquisition returns a clone sharing state with the original, so
/// handles created up front keep working across re-initialization.
#[derive(Debug, Default)]
pub struct MockDriverManager {
    printer: Option<MockPrinter>,
    scanner: Option<MockScanner>,
    acquisitions: Arc<AtomicUsize>,
}

impl MockDriverManager {
    pub fn new(printer: Option<MockPrinter>, scanner: Option<MockScanner>) -> Self {
        Self {
            printer,
            scanner,
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A terminal with a default printer and a QR scanner.
    pub fn standard() -> (Self, MockPrinterHandle, MockScannerHandle) {
        let (printer, printer_handle) = MockPrinter::new();
        let (scanner, scanner_handle) = MockScanner::new();
        (
            Self::new(Some(printer), Some(scanner)),
            printer_handle,
            scanner_handle,
        )
    }

    /// Number of successful printer acquisitions so far.
    pub fn printer_acquisitions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.acquisitions)
    }
}

impl DriverManager for MockDriverManager {
    async fn printer(&mut self) -> Result<AnyPrinterDevice> {
        let printer = self
            .printer
            .clone()
            .ok_or_else(|| HardwareError::not_available("Printer"))?;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        Ok(AnyPrinterDevice::Mock(printer))
    }

    async fn scanner(&mut self) -> Result<Option<AnyScannerDevice>> {
        Ok(self.scanner.clone().map(AnyScannerDevice::Mock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PrinterDevice;

    #[tokio::test]
    async fn test_standard_terminal() {
        let (mut manager, printer_handle, _scanner_handle) = MockDriverManager::standard();

        let mut printer = manager.printer().await.unwrap();
        assert!(manager.scanner().await.unwrap().is_some());

        printer.open_cutter().await.unwrap();
        assert_eq!(printer_handle.cuts(), 1);
    }

    #[tokio::test]
    async fn test_missing_printer() {
        let mut manager = MockDriverManager::new(None, None);

        let err = manager.printer().await.unwrap_err();
        assert_eq!(err.to_string(), "Printer not available");
        assert!(manager.scanner().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reacquire_counts() {
        let (mut manager, _, _) = MockDriverManager::standard();
        let counter = manager.printer_acquisitions();

        manager.printer().await.unwrap();
        manager.printer().await.unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
