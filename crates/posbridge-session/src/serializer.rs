//! Bounded FIFO of commands for the worker.

use crate::dispatcher::{PendingResponse, ResponseSlot, response_slot};
use posbridge_core::{Error, QrSize, Result};
use posbridge_protocol::{Method, ReceiptData};
use std::sync::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A validated device command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Initialize,
    Open,
    Close,
    DeviceInfo,
    PrinterStatus,
    PrintText { text: String },
    PrintReceipt { data: Box<ReceiptData> },
    PrintQrCode { data: String, size: QrSize },
    PrintBarcode { data: String },
    CutPaper,
    Scan,
    StopScan,
}

impl Command {
    pub fn method(&self) -> Method {
        match self {
            Command::Initialize => Method::InitializeDevice,
            Command::Open => Method::OpenDevice,
            Command::Close => Method::CloseDevice,
            Command::DeviceInfo => Method::GetDeviceInfo,
            Command::PrinterStatus => Method::GetPrinterStatus,
            Command::PrintText { .. } => Method::PrintText,
            Command::PrintReceipt { .. } => Method::PrintReceipt,
            Command::PrintQrCode { .. } => Method::PrintQrCode,
            Command::PrintBarcode { .. } => Method::PrintBarcode,
            Command::CutPaper => Method::CutPaper,
            Command::Scan => Method::ScanQrCode,
            Command::StopScan => Method::StopQrScan,
        }
    }
}

/// A command plus the slot its result goes to.
#[derive(Debug)]
pub struct Job {
    pub command: Command,
    pub slot: ResponseSlot,
}

/// Submission side of the worker queue.
///
/// Submission never waits: a full queue is `BUSY`, a closed one is
/// `SHUTDOWN`.
#[derive(Debug)]
pub struct CommandQueue {
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    capacity: usize,
}

impl CommandQueue {
    /// Create a queue holding at most `capacity` pending jobs.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Job>) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx: Mutex::new(Some(tx)),
                capacity,
            },
            rx,
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue a command and return the handle to await its result.
    pub fn submit(&self, command: Command) -> Result<PendingResponse> {
        let guard = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(tx) = guard.as_ref() else {
            return Err(Error::Shutdown);
        };

        let (slot, pending) = response_slot(command.method());
        match tx.try_send(Job { command, slot }) {
            Ok(()) => Ok(pending),
            Err(TrySendError::Full(job)) => {
                job.slot.resolve(Error::Busy {
                    capacity: self.capacity,
                });
                Err(Error::Busy {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Closed(job)) => {
                job.slot.resolve(Error::Shutdown);
                Err(Error::Shutdown)
            }
        }
    }

    /// Stop accepting jobs. Already queued jobs stay in the channel.
    pub fn close(&self) {
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}
