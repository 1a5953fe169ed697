//! The bridge worker: the only task that touches the hardware.
//!
//! Jobs are taken from the queue one at a time and run to completion. While
//! a scan is waiting, the loop also listens to scanner input and the scan
//! deadline, so a stop, a scan result and a timeout race on equal footing;
//! whichever the loop sees first settles the scan and the others find it no
//! longer waiting.

use crate::config::BridgeConfig;
use crate::dispatcher::ResponseSlot;
use crate::oracle::PrinterStatus;
use crate::receipt::{compose_receipt, generate_order_number};
use crate::scan::ScanSession;
use crate::serializer::{Command, Job};
use crate::session::{DeviceSession, hardware_error};
use crate::state_machine::ScanState;
use chrono::Utc;
use posbridge_core::constants::{
    BARCODE_HEIGHT, BARCODE_WIDTH, PRINTER_STATUS_OK, SDK_VERSION, SERIAL_NUMBER_PREFIX,
};
use posbridge_core::{DeviceStatus, Error, ErrorCode, QrSize, Result};
use posbridge_hardware::{
    Alignment, AnyScannerDevice, BarcodeSpec, HardwareError, PrinterDevice, ScannerDevice,
    Symbology, TextFormat,
};
use posbridge_protocol::{
    Ack, DeviceInfoReport, Initialized, Opened, Precondition, PrinterStatusReport, QrPrinted,
    ReceiptData, ReceiptPrinted, Response, ScanOutcome,
};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, trace, warn};

const SCANNER_UNAVAILABLE: &str = "QR Scanner not available on this device";

enum Event {
    Job(Job),
    ScanInput(std::result::Result<String, HardwareError>),
    ScanDeadline,
}

pub struct Worker {
    session: DeviceSession,
    scan: ScanSession,
    config: BridgeConfig,
    status_tx: watch::Sender<DeviceStatus>,
}

impl Worker {
    pub fn new(
        session: DeviceSession,
        config: BridgeConfig,
        status_tx: watch::Sender<DeviceStatus>,
    ) -> Self {
        Self {
            session,
            scan: ScanSession::new(),
            config,
            status_tx,
        }
    }

    /// Process jobs until the queue is closed and drained.
    pub async fn run(mut self, mut jobs: mpsc::Receiver<Job>) {
        info!("Bridge worker started");

        loop {
            let waiting = self.scan.is_waiting();
            let deadline = self.scan.deadline().unwrap_or_else(Instant::now);

            let event = tokio::select! {
                biased;

                input = next_scan(self.session.scanner_mut()), if waiting => Event::ScanInput(input),
                () = time::sleep_until(deadline), if waiting => Event::ScanDeadline,
                job = jobs.recv() => match job {
                    Some(job) => Event::Job(job),
                    None => break,
                },
            };

            match event {
                Event::Job(job) => self.handle_job(job).await,
                Event::ScanInput(Ok(text)) => {
                    let text = text.trim();
                    if text.is_empty() {
                        trace!("Ignoring empty scan input");
                        continue;
                    }
                    debug!(len = text.len(), "QR scan result received");
                    self.finish_scan(ScanOutcome::scanned(text), ScanState::Completed)
                        .await;
                }
                Event::ScanInput(Err(e)) => {
                    error!(error = %e, "QR scanner read failed");
                    self.finish_scan(
                        ScanOutcome::failed(format!("Failed to read QR scanner: {e}")),
                        ScanState::Errored,
                    )
                    .await;
                }
                Event::ScanDeadline => {
                    debug!("QR scan timeout");
                    self.finish_scan(
                        ScanOutcome::failed("Scan timeout - no QR code detected"),
                        ScanState::TimedOut,
                    )
                    .await;
                }
            }
        }

        if self.scan.is_active() {
            self.cancel_scan();
            self.power_down_scanner().await;
        }
        self.publish();
        info!("Bridge worker stopped");
    }

    async fn handle_job(&mut self, job: Job) {
        let method = job.command.method();
        trace!(%method, "Running command");

        match job.command {
            Command::Scan => self.start_scan(job.slot).await,
            command => {
                let response = self.execute(command).await;
                self.publish();
                job.slot.resolve(response);
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Response {
        let method = command.method();
        if let Err(e) = self.session.require(method.precondition()) {
            return Response::from(e);
        }

        let result = match command {
            Command::Initialize => self.initialize().await,
            Command::Open => self.open().await,
            Command::Close => self.close().await,
            Command::DeviceInfo => self.device_info().await,
            Command::PrinterStatus => self.printer_status().await,
            Command::PrintText { text } => self.print_text(&text).await,
            Command::PrintReceipt { data } => self.print_receipt(&data).await,
            Command::PrintQrCode { data, size } => self.print_qr_code(&data, size).await,
            Command::PrintBarcode { data } => self.print_barcode(&data).await,
            Command::CutPaper => self.cut_paper().await,
            Command::StopScan => self.stop_scan().await,
            // Scans are held, not answered here
            Command::Scan => Err(Error::not_supported("Scan cannot run inline")),
        };

        result.unwrap_or_else(|e| {
            warn!(%method, code = %e.code(), error = %e, "Command failed");
            Response::from(e)
        })
    }

    fn publish(&self) {
        self.status_tx
            .send_replace(self.session.status(self.scan.is_active()));
    }

    // Session lifecycle

    async fn initialize(&mut self) -> Result<Response> {
        if self.scan.is_active() {
            self.cancel_scan();
            self.power_down_scanner().await;
        }

        let caps = self.session.initialize().await?;
        Ok(Response::success(&Initialized {
            success: true,
            message: "SDK initialized successfully".to_string(),
            supports_cutter: caps.supports_cutter,
            has_qr_scanner: caps.has_qr_scanner,
        }))
    }

    async fn open(&mut self) -> Result<Response> {
        self.session.open().await?;
        Ok(Response::success(&Opened {
            success: true,
            message: "Printer opened successfully".to_string(),
            status: "ready".to_string(),
        }))
    }

    async fn close(&mut self) -> Result<Response> {
        if self.scan.is_active() {
            self.cancel_scan();
            self.power_down_scanner().await;
            debug!("QR scanner stopped during device close");
        }
        self.session.mark_closed();
        Ok(Response::success(&Ack::ok("Device closed successfully")))
    }

    async fn device_info(&mut self) -> Result<Response> {
        const CONTEXT: &str = "Failed to get device info";
        let fail = |e| hardware_error(ErrorCode::InfoError, CONTEXT, e);

        let status = self.session.printer_status().await.map_err(fail)?;
        let printer = self.session.printer().map_err(fail)?;
        let info = printer.get_info().await.map_err(fail)?;
        let caps = self.session.capabilities();

        Ok(Response::success(&DeviceInfoReport {
            model: info.model,
            serial_number: info.serial_number.unwrap_or_else(|| {
                format!("{SERIAL_NUMBER_PREFIX}{}", Utc::now().timestamp_millis())
            }),
            sdk_version: info
                .firmware_version
                .unwrap_or_else(|| SDK_VERSION.to_string()),
            supports_cutter: caps.supports_cutter,
            has_qr_scanner: caps.has_qr_scanner,
            printer_status: status.to_string(),
            is_80mm_printer: printer.is_80mm(),
        }))
    }

    async fn printer_status(&mut self) -> Result<Response> {
        let status = self.session.printer_status().await.map_err(|e| {
            hardware_error(ErrorCode::StatusError, "Failed to get printer status", e)
        })?;

        Ok(Response::success(&PrinterStatusReport {
            status_code: status.code(),
            status_message: status.to_string(),
            is_ready: status.is_ready(),
            is_paper_out: status.is_paper_out(),
        }))
    }

    // Printing

    /// Fail fast when the printer is out of paper.
    async fn preflight(&mut self, context: &str) -> Result<PrinterStatus> {
        let status = self
            .session
            .printer_status()
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, context, e))?;

        if status.is_paper_out() {
            return Err(Error::device(
                ErrorCode::PrintError,
                format!("{context}: {status}"),
            ));
        }
        Ok(status)
    }

    /// Start the print and check its result code.
    async fn commit(&mut self, context: &str) -> Result<()> {
        let code = self
            .session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::PrintError, context, e))?
            .start_print()
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, context, e))?;

        check_print_code(code)
    }

    async fn print_text(&mut self, text: &str) -> Result<Response> {
        const CONTEXT: &str = "Failed to print text";
        self.preflight(CONTEXT).await?;

        let format = TextFormat::new(40).monospace();
        let printer = self
            .session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;
        append_all(printer, &[(text, &format), ("\n", &format)])
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;

        self.commit(CONTEXT).await?;
        info!(len = text.len(), "Text printed");
        Ok(Response::success(&Ack::ok("Text printed successfully")))
    }

    async fn print_qr_code(&mut self, data: &str, size: QrSize) -> Result<Response> {
        const CONTEXT: &str = "Failed to print QR code";
        self.preflight(CONTEXT).await?;

        self.session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?
            .append_qr_code(data, size.get(), Alignment::Center)
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;

        self.commit(CONTEXT).await?;
        info!(%size, "QR code printed");
        Ok(Response::success(&QrPrinted {
            success: true,
            message: "QR Code printed successfully".to_string(),
            size: size.get(),
        }))
    }

    async fn print_barcode(&mut self, data: &str) -> Result<Response> {
        const CONTEXT: &str = "Failed to print barcode";
        self.preflight(CONTEXT).await?;

        let spec = BarcodeSpec {
            symbology: Symbology::Code128,
            width: BARCODE_WIDTH,
            height: BARCODE_HEIGHT,
            show_text: true,
            alignment: Alignment::Center,
        };
        self.session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?
            .append_barcode(data, &spec)
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;

        self.commit(CONTEXT).await?;
        info!("Barcode printed");
        Ok(Response::success(&Ack::ok("Barcode printed successfully")))
    }

    async fn print_receipt(&mut self, data: &ReceiptData) -> Result<Response> {
        const CONTEXT: &str = "Failed to print receipt";
        self.preflight(CONTEXT).await?;

        if data.has_invalid_qr_size() {
            warn!(qr_size = ?data.qr_size, "Invalid QR size, using default");
        }
        let order_number = data
            .order_number()
            .map_or_else(generate_order_number, str::to_string);
        let elements = compose_receipt(data, &order_number);

        let printer = self
            .session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;
        for element in &elements {
            printer
                .append(element)
                .await
                .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;
        }

        let code = printer
            .start_print()
            .await
            .map_err(|e| hardware_error(ErrorCode::PrintError, CONTEXT, e))?;

        time::sleep(self.config.post_print_settle).await;
        match self.session.printer_status().await {
            Ok(status) => debug!(status = status.code(), "Final printer status"),
            Err(e) => warn!(error = %e, "Failed to read final printer status"),
        }

        check_print_code(code)?;
        info!(%order_number, lines = elements.len(), "Receipt printed");
        Ok(Response::success(&ReceiptPrinted {
            success: true,
            message: "Receipt printed successfully".to_string(),
            order_number,
        }))
    }

    async fn cut_paper(&mut self) -> Result<Response> {
        const CONTEXT: &str = "Failed to cut paper";

        if !self.session.capabilities().supports_cutter {
            return Err(cutter_not_supported());
        }

        let status = self
            .session
            .printer_status()
            .await
            .map_err(|e| hardware_error(ErrorCode::CutError, CONTEXT, e))?;
        if !status.is_ready() {
            return Err(Error::device(
                ErrorCode::CutError,
                format!("{CONTEXT}: Printer not ready for cutting"),
            ));
        }

        self.session
            .printer_mut()
            .map_err(|e| hardware_error(ErrorCode::CutError, CONTEXT, e))?
            .open_cutter()
            .await
            .map_err(|e| hardware_error(ErrorCode::CutError, CONTEXT, e))?;

        info!("Paper cut");
        Ok(Response::success(&Ack::ok("Paper cut successfully")))
    }

    // Scanning

    async fn start_scan(&mut self, slot: ResponseSlot) {
        if let Err(e) = self.session.require(Precondition::Opened) {
            slot.resolve(e);
            return;
        }
        if self.session.scanner_mut().is_none() {
            slot.resolve(Response::success(&ScanOutcome::failed(SCANNER_UNAVAILABLE)));
            return;
        }
        if self.scan.arm().is_err() {
            slot.resolve(Response::success(&ScanOutcome::failed(
                "Scanner is already in use",
            )));
            return;
        }
        self.publish();
        debug!("Starting QR scan");

        if let Err(e) = self.arm_scanner().await {
            error!(error = %e, "Failed to activate QR scanner");
            self.power_down_scanner().await;
            let _ = self.scan.settle(ScanState::Errored);
            self.publish();
            slot.resolve(Response::success(&ScanOutcome::failed(format!(
                "Failed to activate scanner: {e}"
            ))));
            return;
        }

        let deadline = Instant::now() + self.config.scan.timeout;
        if let Err(e) = self.scan.wait(slot, deadline) {
            error!(error = %e, "Scan session out of step");
            return;
        }
        self.publish();
        debug!(
            timeout_ms = self.config.scan.timeout.as_millis() as u64,
            "QR scanner activated, waiting for scan"
        );
    }

    /// Power-cycle the scanner and enable capture.
    async fn arm_scanner(&mut self) -> std::result::Result<(), HardwareError> {
        let settle_off = self.config.scan.power_off_settle;
        let settle_on = self.config.scan.power_on_settle;
        let scanner = self
            .session
            .scanner_mut()
            .ok_or_else(|| HardwareError::not_available("QR scanner"))?;

        scanner.set_power(false).await?;
        time::sleep(settle_off).await;
        scanner.set_power(true).await?;
        time::sleep(settle_on).await;
        discard_unread(scanner).await?;
        scanner.set_control(true).await
    }

    async fn stop_scan(&mut self) -> Result<Response> {
        if self.session.scanner_mut().is_none() {
            return Ok(Response::success(&ScanOutcome::failed(format!(
                "Failed to stop QR scanner: {SCANNER_UNAVAILABLE}"
            ))));
        }

        self.cancel_scan();

        let outcome = match self.stop_scanner().await {
            Ok(()) => {
                info!("QR scanner powered off");
                ScanOutcome::acknowledged("QR scanner powered off")
            }
            Err(e) => {
                error!(error = %e, "Failed to stop QR scanner");
                ScanOutcome::failed(format!("Failed to stop QR scanner: {e}"))
            }
        };
        Ok(Response::success(&outcome))
    }

    async fn stop_scanner(&mut self) -> std::result::Result<(), HardwareError> {
        if let Some(scanner) = self.session.scanner_mut() {
            scanner.set_power(false).await?;
            scanner.set_control(false).await?;
        }
        Ok(())
    }

    /// Resolve a waiting scan as cancelled.
    fn cancel_scan(&mut self) {
        if self.scan.is_active() {
            debug!("Cancelling QR scan");
            self.settle_scan(
                ScanOutcome::failed("Scan cancelled"),
                ScanState::Cancelled,
            );
        }
    }

    /// End a scan: scanner off, state back to Idle, caller answered.
    async fn finish_scan(&mut self, outcome: ScanOutcome, state: ScanState) {
        self.power_down_scanner().await;
        self.settle_scan(outcome, state);
    }

    fn settle_scan(&mut self, outcome: ScanOutcome, state: ScanState) {
        let slot = self.scan.settle(state);
        self.publish();
        if let Some(slot) = slot {
            slot.resolve(Response::success(&outcome));
        }
    }

    /// Best-effort scanner shutdown; failures are logged only.
    async fn power_down_scanner(&mut self) {
        let Some(scanner) = self.session.scanner_mut() else {
            return;
        };
        if let Err(e) = scanner.set_control(false).await {
            warn!(error = %e, "Failed to disable QR scanner capture");
        }
        if let Err(e) = scanner.set_power(false).await {
            warn!(error = %e, "Failed to power off QR scanner");
        }
        if let Err(e) = discard_unread(scanner).await {
            warn!(error = %e, "Failed to clear QR scanner input");
        }
    }
}

/// Drop input left over from an earlier scan so it cannot answer the next one.
async fn discard_unread(scanner: &mut AnyScannerDevice) -> std::result::Result<(), HardwareError> {
    let dropped = scanner.clear_input().await?;
    if dropped > 0 {
        debug!(dropped, "Discarded unread QR scanner input");
    }
    Ok(())
}

/// Next scan input, or never if there is no scanner.
async fn next_scan(
    scanner: Option<&mut AnyScannerDevice>,
) -> std::result::Result<String, HardwareError> {
    match scanner {
        Some(scanner) => scanner.read_scan().await,
        None => std::future::pending().await,
    }
}

async fn append_all<P: PrinterDevice>(
    printer: &mut P,
    lines: &[(&str, &TextFormat)],
) -> std::result::Result<(), HardwareError> {
    for (text, format) in lines {
        printer.append_text(text, format).await?;
    }
    Ok(())
}

fn check_print_code(code: i32) -> Result<()> {
    if code == PRINTER_STATUS_OK {
        Ok(())
    } else {
        Err(Error::device(
            ErrorCode::PrintError,
            format!("Print failed with code: {code}"),
        ))
    }
}

pub(crate) fn cutter_not_supported() -> Error {
    Error::not_supported("Paper cutter not supported on this device")
}
