//! Device session: lifecycle flags and device handles.

use crate::oracle::PrinterStatus;
use posbridge_core::{Capabilities, DeviceStatus, Error, ErrorCode, Result};
use posbridge_hardware::{
    AnyDriverManager, AnyPrinterDevice, AnyScannerDevice, DriverManager, HardwareError,
    PrinterDevice,
};
use posbridge_protocol::Precondition;
use tracing::{debug, info, warn};

/// Lifecycle of the terminal as seen by the bridge.
///
/// Owned by the worker task; `opened` implies `initialized`.
#[derive(Debug)]
pub struct DeviceSession {
    manager: AnyDriverManager,
    printer: Option<AnyPrinterDevice>,
    scanner: Option<AnyScannerDevice>,
    initialized: bool,
    opened: bool,
    capabilities: Capabilities,
}

impl DeviceSession {
    pub fn new(manager: AnyDriverManager) -> Self {
        Self {
            manager,
            printer: None,
            scanner: None,
            initialized: false,
            opened: false,
            capabilities: Capabilities::default(),
        }
    }

    /// Acquire device handles and discover capabilities.
    ///
    /// The printer is required; a missing scanner is only logged. Calling
    /// again re-acquires both handles.
    pub async fn initialize(&mut self) -> Result<Capabilities> {
        debug!("Initializing device session");

        let printer = self
            .manager
            .printer()
            .await
            .map_err(|e| hardware_error(ErrorCode::InitError, "Failed to initialize SDK", e))?;

        let scanner = match self.manager.scanner().await {
            Ok(scanner) => scanner,
            Err(e) => {
                warn!(error = %e, "Failed to acquire QR scanner");
                None
            }
        };
        if scanner.is_none() {
            warn!("QR Scanner not available on this device");
        }

        self.capabilities = Capabilities {
            supports_cutter: printer.supports_cutter(),
            has_qr_scanner: scanner.is_some(),
        };
        self.printer = Some(printer);
        self.scanner = scanner;
        self.initialized = true;

        info!(
            supports_cutter = self.capabilities.supports_cutter,
            has_qr_scanner = self.capabilities.has_qr_scanner,
            "Device session initialized"
        );
        Ok(self.capabilities)
    }

    /// Mark the device opened if the printer reports ready.
    pub async fn open(&mut self) -> Result<()> {
        self.require(Precondition::Initialized)?;

        let status = self
            .printer_status()
            .await
            .map_err(|e| hardware_error(ErrorCode::OpenError, "Failed to open device", e))?;

        if !status.is_ready() {
            return Err(Error::device(
                ErrorCode::OpenError,
                format!("Failed to open device: Printer not ready: {status}"),
            ));
        }

        self.opened = true;
        info!("Printer opened");
        Ok(())
    }

    /// Clear the opened flag. Scanner shutdown is handled by the caller.
    pub fn mark_closed(&mut self) {
        if self.opened {
            info!("Device closed");
        }
        self.opened = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Snapshot of the session flags.
    pub fn status(&self, scanner_active: bool) -> DeviceStatus {
        DeviceStatus::new(
            self.initialized,
            self.opened,
            self.capabilities,
            scanner_active && self.capabilities.has_qr_scanner,
        )
    }

    /// Check that the session is far enough along for a command.
    pub fn require(&self, precondition: Precondition) -> Result<()> {
        check_precondition(&self.status(false), precondition)
    }

    /// Query and classify the printer status.
    pub async fn printer_status(&mut self) -> std::result::Result<PrinterStatus, HardwareError> {
        let code = self.printer_mut()?.status().await?;
        Ok(PrinterStatus::classify(code))
    }

    pub fn printer_mut(&mut self) -> std::result::Result<&mut AnyPrinterDevice, HardwareError> {
        self.printer
            .as_mut()
            .ok_or_else(|| HardwareError::not_available("Printer"))
    }

    pub fn printer(&self) -> std::result::Result<&AnyPrinterDevice, HardwareError> {
        self.printer
            .as_ref()
            .ok_or_else(|| HardwareError::not_available("Printer"))
    }

    pub fn scanner_mut(&mut self) -> Option<&mut AnyScannerDevice> {
        self.scanner.as_mut()
    }
}

/// Check a precondition against a status snapshot.
pub fn check_precondition(status: &DeviceStatus, precondition: Precondition) -> Result<()> {
    match precondition {
        Precondition::None => Ok(()),
        Precondition::Initialized if !status.initialized => Err(Error::NotInitialized),
        Precondition::Initialized => Ok(()),
        Precondition::Opened if !status.initialized => Err(Error::NotInitialized),
        Precondition::Opened if !status.opened => Err(Error::NotOpened),
        Precondition::Opened => Ok(()),
    }
}

/// Wrap a driver failure as `"<context>: <driver message>"` under `code`.
pub fn hardware_error(code: ErrorCode, context: &str, error: HardwareError) -> Error {
    Error::device(code, format!("{context}: {error}"))
}
