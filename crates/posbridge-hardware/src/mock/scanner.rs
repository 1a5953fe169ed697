//! Mock QR scanner fed through a channel.

use crate::{HardwareError, Result, traits::ScannerDevice, types::DeviceInfo};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, mpsc};

/// Power or control change seen by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerOp {
    Power(bool),
    Control(bool),
}

#[derive(Debug)]
enum ScanInput {
    Decoded(String),
    Fault(String),
}

#[derive(Debug, Default)]
struct ScannerState {
    powered: bool,
    control: bool,
    failure: Option<String>,
    journal: Vec<ScannerOp>,
}

#[derive(Debug, Clone)]
pub struct MockScanner {
    input_rx: Arc<AsyncMutex<mpsc::Receiver<ScanInput>>>,
    state: Arc<Mutex<ScannerState>>,
    name: String,
}

impl MockScanner {
    pub fn new() -> (Self, MockScannerHandle) {
        Self::with_name("Mock QR Scanner".to_string())
    }

    pub fn with_name(name: String) -> (Self, MockScannerHandle) {
        let (input_tx, input_rx) = mpsc::channel(32);
        let state = Arc::new(Mutex::new(ScannerState::default()));

        let scanner = Self {
            input_rx: Arc::new(AsyncMutex::new(input_rx)),
            state: Arc::clone(&state),
            name,
        };

        (scanner, MockScannerHandle { input_tx, state })
    }

    fn record(&self, op: ScannerOp) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.failure {
            return Err(HardwareError::communication(message.clone()));
        }
        match op {
            ScannerOp::Power(on) => state.powered = on,
            ScannerOp::Control(enabled) => state.control = enabled,
        }
        state.journal.push(op);
        Ok(())
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new().0
    }
}

impl ScannerDevice for MockScanner {
    async fn set_power(&mut self, on: bool) -> Result<()> {
        self.record(ScannerOp::Power(on))
    }

    async fn set_control(&mut self, enabled: bool) -> Result<()> {
        self.record(ScannerOp::Control(enabled))
    }

    async fn read_scan(&mut self) -> Result<String> {
        let mut input_rx = self.input_rx.lock().await;
        match input_rx.recv().await {
            Some(ScanInput::Decoded(text)) => Ok(text),
            Some(ScanInput::Fault(message)) => Err(HardwareError::communication(message)),
            None => Err(HardwareError::disconnected("QR scanner input channel closed")),
        }
    }

    async fn clear_input(&mut self) -> Result<usize> {
        let mut input_rx = self.input_rx.lock().await;
        let mut dropped = 0;
        while input_rx.try_recv().is_ok() {
            dropped += 1;
        }
        Ok(dropped)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock QR Scanner v1.0").with_firmware_version("1.0.0"))
    }
}

/// Control side of a [`MockScanner`].
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    input_tx: mpsc::Sender<ScanInput>,
    state: Arc<Mutex<ScannerState>>,
}

impl MockScannerHandle {
    /// Deliver decoded text as if a code had been presented.
    ///
    /// A scanner that is not powered with capture enabled reads nothing, so
    /// the input is dropped and `Ok(false)` is returned.
    pub async fn send_scan(&self, text: impl Into<String>) -> Result<bool> {
        self.deliver(ScanInput::Decoded(text.into())).await
    }

    /// Make the pending read fail with a communication error.
    pub async fn send_fault(&self, message: impl Into<String>) -> Result<bool> {
        self.deliver(ScanInput::Fault(message.into())).await
    }

    async fn deliver(&self, input: ScanInput) -> Result<bool> {
        if !self.is_armed() {
            return Ok(false);
        }
        self.input_tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected("QR scanner input channel closed"))?;
        Ok(true)
    }

    /// Returns `true` if the scanner is powered and capture is enabled.
    pub fn is_armed(&self) -> bool {
        let state = lock(&self.state);
        state.powered && state.control
    }

    /// Make power and control changes fail until cleared.
    pub fn set_failure(&self, message: Option<&str>) {
        lock(&self.state).failure = message.map(str::to_string);
    }

    pub fn is_powered(&self) -> bool {
        lock(&self.state).powered
    }

    pub fn is_control_enabled(&self) -> bool {
        lock(&self.state).control
    }

    /// Power and control changes, oldest first.
    pub fn journal(&self) -> Vec<ScannerOp> {
        lock(&self.state).journal.clone()
    }
}

fn lock(state: &Mutex<ScannerState>) -> MutexGuard<'_, ScannerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
