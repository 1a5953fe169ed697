//! Mock thermal printer.
//!
//! The printer and its [`MockPrinterHandle`] share state, so tests can
//! change the status code or inject failures while the printer is owned by
//! the bridge worker, and inspect everything that reached the device.

use crate::{
    HardwareError, Result,
    traits::PrinterDevice,
    types::{Alignment, BarcodeSpec, DeviceInfo, PrintElement, TextFormat},
};
use posbridge_core::constants::{DEVICE_MODEL, PRINTER_STATUS_OK};
use std::sync::{Arc, Mutex, MutexGuard};

/// Something the printer was asked to do, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterOp {
    Append(PrintElement),
    /// A print was started; carries the elements committed to paper.
    Print(Vec<PrintElement>),
    Cut,
}

/// Static capabilities of a mock printer.
#[derive(Debug, Clone)]
pub struct MockPrinterConfig {
    pub name: String,
    pub supports_cutter: bool,
    pub is_80mm: bool,
}

impl Default for MockPrinterConfig {
    fn default() -> Self {
        Self {
            name: "Mock Printer".to_string(),
            supports_cutter: true,
            is_80mm: false,
        }
    }
}

#[derive(Debug)]
struct PrinterState {
    status_code: i32,
    start_print_code: i32,
    failure: Option<String>,
    buffer: Vec<PrintElement>,
    journal: Vec<PrinterOp>,
}

impl PrinterState {
    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(HardwareError::communication(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockPrinter {
    state: Arc<Mutex<PrinterState>>,
    config: MockPrinterConfig,
}

impl MockPrinter {
    pub fn new() -> (Self, MockPrinterHandle) {
        Self::with_config(MockPrinterConfig::default())
    }

    pub fn with_config(config: MockPrinterConfig) -> (Self, MockPrinterHandle) {
        let state = Arc::new(Mutex::new(PrinterState {
            status_code: PRINTER_STATUS_OK,
            start_print_code: PRINTER_STATUS_OK,
            failure: None,
            buffer: Vec::new(),
            journal: Vec::new(),
        }));

        let printer = Self {
            state: Arc::clone(&state),
            config,
        };

        (printer, MockPrinterHandle { state })
    }

    fn state(&self) -> MutexGuard<'_, PrinterState> {
        lock(&self.state)
    }

    fn push(&self, element: PrintElement) -> Result<()> {
        let mut state = self.state();
        state.check()?;
        state.buffer.push(element.clone());
        state.journal.push(PrinterOp::Append(element));
        Ok(())
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new().0
    }
}

impl PrinterDevice for MockPrinter {
    async fn status(&mut self) -> Result<i32> {
        let state = self.state();
        state.check()?;
        Ok(state.status_code)
    }

    async fn append_text(&mut self, text: &str, format: &TextFormat) -> Result<()> {
        self.push(PrintElement::text(text, *format))
    }

    async fn append_qr_code(&mut self, data: &str, size: u32, alignment: Alignment) -> Result<()> {
        self.push(PrintElement::QrCode {
            data: data.to_string(),
            size,
            alignment,
        })
    }

    async fn append_barcode(&mut self, data: &str, spec: &BarcodeSpec) -> Result<()> {
        self.push(PrintElement::Barcode {
            data: data.to_string(),
            spec: *spec,
        })
    }

    async fn start_print(&mut self) -> Result<i32> {
        let mut state = self.state();
        state.check()?;

        let elements = std::mem::take(&mut state.buffer);
        let code = state.start_print_code;
        if code == PRINTER_STATUS_OK {
            state.journal.push(PrinterOp::Print(elements));
        }
        Ok(code)
    }

    async fn open_cutter(&mut self) -> Result<()> {
        if !self.config.supports_cutter {
            return Err(HardwareError::unsupported("Paper cutting"));
        }
        let mut state = self.state();
        state.check()?;
        state.journal.push(PrinterOp::Cut);
        Ok(())
    }

    fn supports_cutter(&self) -> bool {
        self.config.supports_cutter
    }

    fn is_80mm(&self) -> bool {
        self.config.is_80mm
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        self.state().check()?;
        Ok(DeviceInfo::new(self.config.name.clone(), DEVICE_MODEL))
    }
}

/// Control side of a [`MockPrinter`].
#[derive(Debug, Clone)]
pub struct MockPrinterHandle {
    state: Arc<Mutex<PrinterState>>,
}

impl MockPrinterHandle {
    /// Set the code returned by status queries.
    pub fn set_status(&self, code: i32) {
        lock(&self.state).status_code = code;
    }

    /// Set the code returned by `start_print`.
    pub fn set_start_print_code(&self, code: i32) {
        lock(&self.state).start_print_code = code;
    }

    /// Make every operation fail with a communication error until cleared.
    pub fn set_failure(&self, message: Option<&str>) {
        lock(&self.state).failure = message.map(str::to_string);
    }

    /// Everything the printer was asked to do, oldest first.
    pub fn journal(&self) -> Vec<PrinterOp> {
        lock(&self.state).journal.clone()
    }

    /// Elements of each successful print, oldest first.
    pub fn printed(&self) -> Vec<Vec<PrintElement>> {
        lock(&self.state)
            .journal
            .iter()
            .filter_map(|op| match op {
                PrinterOp::Print(elements) => Some(elements.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of cuts performed.
    pub fn cuts(&self) -> usize {
        lock(&self.state)
            .journal
            .iter()
            .filter(|op| matches!(op, PrinterOp::Cut))
            .count()
    }
}

fn lock(state: &Mutex<PrinterState>) -> MutexGuard<'_, PrinterState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
