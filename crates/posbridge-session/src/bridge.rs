//! Public entry point: validates requests and feeds the worker.

use crate::config::BridgeConfig;
use crate::dispatcher::PendingResponse;
use crate::serializer::{Command, CommandQueue};
use crate::session::{DeviceSession, check_precondition};
use crate::worker::{Worker, cutter_not_supported};
use posbridge_core::{DeviceStatus, Result};
use posbridge_hardware::AnyDriverManager;
use posbridge_protocol::{Method, Payload, Request, Response, ScanOutcome, args};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of [`PosBridge::submit`].
#[derive(Debug)]
pub enum Reply {
    /// Answered without reaching the worker.
    Ready(Response),
    /// Queued; resolves once the worker has run it.
    Queued(PendingResponse),
}

impl Reply {
    pub async fn wait(self) -> Response {
        match self {
            Self::Ready(response) => response,
            Self::Queued(pending) => pending.wait().await,
        }
    }
}

/// Handle to a running bridge.
///
/// Cloning is cheap; all clones share one worker. Commands are executed
/// strictly in the order [`submit`](Self::submit) accepted them.
///
/// # Examples
///
/// ```no_run
/// use posbridge_hardware::AnyDriverManager;
/// use posbridge_hardware::mock::MockDriverManager;
/// use posbridge_protocol::Request;
/// use posbridge_session::{BridgeConfig, PosBridge};
///
/// # async fn example() {
/// let (manager, _printer, _scanner) = MockDriverManager::standard();
/// let bridge = PosBridge::start(AnyDriverManager::Mock(manager), BridgeConfig::default());
///
/// bridge.call(Request::new("initializeDevice")).await;
/// bridge.call(Request::new("openDevice")).await;
/// let response = bridge.call(Request::new("printText").arg("text", "Hello")).await;
/// assert!(response.is_success());
///
/// bridge.shutdown().await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PosBridge {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    queue: CommandQueue,
    status_rx: watch::Receiver<DeviceStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
    config: BridgeConfig,
}

impl PosBridge {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(manager: AnyDriverManager, config: BridgeConfig) -> Self {
        let (queue, jobs) = CommandQueue::new(config.queue_capacity);
        let (status_tx, status_rx) = watch::channel(DeviceStatus::default());

        let worker = Worker::new(DeviceSession::new(manager), config.clone(), status_tx);
        let handle = tokio::spawn(worker.run(jobs));

        info!(queue_capacity = queue.capacity(), "POS bridge started");
        Self {
            inner: Arc::new(Inner {
                queue,
                status_rx,
                worker: Mutex::new(Some(handle)),
                config,
            }),
        }
    }

    /// Latest published session snapshot. Never touches the device.
    pub fn status(&self) -> DeviceStatus {
        *self.inner.status_rx.borrow()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Run one request to completion.
    ///
    /// Unknown method names are answered with [`Response::NotImplemented`].
    pub async fn call(&self, request: Request) -> Response {
        self.submit(request).wait().await
    }

    /// Validate a request and queue it without waiting for the result.
    ///
    /// The queue position is taken before this returns, so requests submitted
    /// one after another reach the device in that order however their
    /// replies are awaited.
    pub fn submit(&self, request: Request) -> Reply {
        let Some(method) = Method::parse(&request.method) else {
            debug!(method = %request.method, "Unknown method");
            return Reply::Ready(Response::NotImplemented);
        };

        match self.dispatch(method, &request.args) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(%method, code = %e.code(), error = %e, "Request rejected");
                Reply::Ready(Response::from(e))
            }
        }
    }

    fn dispatch(&self, method: Method, args: &Payload) -> Result<Reply> {
        let status = self.status();

        if method == Method::GetDeviceStatus {
            return Ok(Reply::Ready(Response::success(&status)));
        }
        check_precondition(&status, method.precondition())?;

        let command = match method {
            Method::InitializeDevice => Command::Initialize,
            Method::OpenDevice => Command::Open,
            Method::CloseDevice => Command::Close,
            Method::GetDeviceInfo => Command::DeviceInfo,
            Method::GetPrinterStatus => Command::PrinterStatus,
            Method::PrintText => Command::PrintText {
                text: args::required_text(args, "text", "Text")?.to_string(),
            },
            Method::PrintReceipt => Command::PrintReceipt {
                data: Box::new(args::receipt_data(args)?),
            },
            Method::PrintQrCode => Command::PrintQrCode {
                data: args::required_text(args, "data", "QR code data")?.to_string(),
                size: args::optional_qr_size(args, "size")?,
            },
            Method::PrintBarcode => Command::PrintBarcode {
                data: args::required_text(args, "data", "Barcode data")?.to_string(),
            },
            Method::CutPaper => {
                if !status.supports_cutter {
                    return Err(cutter_not_supported());
                }
                Command::CutPaper
            }
            Method::ScanQrCode => {
                if !status.has_qr_scanner {
                    return Ok(Reply::Ready(Response::success(&ScanOutcome::failed(
                        "QR Scanner not available on this device",
                    ))));
                }
                if status.scanner_active {
                    return Ok(Reply::Ready(Response::success(&ScanOutcome::failed(
                        "Scanner is already in use",
                    ))));
                }
                Command::Scan
            }
            Method::StopQrScan => Command::StopScan,
            Method::GetDeviceStatus => return Ok(Reply::Ready(Response::success(&status))),
        };

        Ok(Reply::Queued(self.inner.queue.submit(command)?))
    }

    /// Stop accepting commands and wait for the worker to drain.
    ///
    /// The worker gets `shutdown_drain` to finish queued jobs; after that it
    /// is aborted and the callers still waiting see `SHUTDOWN`. Later calls
    /// are rejected with `SHUTDOWN`. Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        self.inner.queue.close();

        let handle = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(mut handle) = handle else {
            return;
        };

        match tokio::time::timeout(self.inner.config.shutdown_drain, &mut handle).await {
            Ok(Ok(())) => info!("POS bridge stopped"),
            Ok(Err(e)) => warn!(error = %e, "Bridge worker failed"),
            Err(_) => {
                warn!(
                    drain_ms = self.inner.config.shutdown_drain.as_millis() as u64,
                    "Bridge worker did not drain in time, aborting"
                );
                handle.abort();
            }
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.queue.is_closed()
    }
}
