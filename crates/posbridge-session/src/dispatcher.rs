//! One-shot delivery of command results.
//!
//! Every queued command carries a [`ResponseSlot`]; the submitter keeps the
//! matching [`PendingResponse`]. Resolving consumes the slot, so a command can
//! be answered at most once. A slot dropped without an answer (worker aborted
//! or job discarded) is seen by the submitter as `SHUTDOWN`.

use posbridge_core::Error;
use posbridge_protocol::{Method, Response};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Create a connected slot/receiver pair for one command.
pub fn response_slot(method: Method) -> (ResponseSlot, PendingResponse) {
    let (tx, rx) = oneshot::channel();
    (
        ResponseSlot {
            method,
            tx: Some(tx),
        },
        PendingResponse { rx },
    )
}

/// Sending half, owned by whoever will produce the result.
#[derive(Debug)]
pub struct ResponseSlot {
    method: Method,
    tx: Option<oneshot::Sender<Response>>,
}

impl ResponseSlot {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Deliver the result, consuming the slot.
    pub fn resolve(mut self, response: impl Into<Response>) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        if tx.send(response.into()).is_err() {
            debug!(method = %self.method, "Caller went away before the response was ready");
        }
    }
}

impl Drop for ResponseSlot {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(method = %self.method, "Command dropped without a response");
        }
    }
}

/// Receiving half, awaited by the caller.
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<Response>,
}

impl PendingResponse {
    pub async fn wait(self) -> Response {
        self.rx
            .await
            .unwrap_or_else(|_| Response::from(Error::Shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posbridge_core::ErrorCode;
    use posbridge_protocol::Ack;

    #[tokio::test]
    async fn test_resolve_delivers_once() {
        let (slot, pending) = response_slot(Method::CloseDevice);
        assert_eq!(slot.method(), Method::CloseDevice);

        slot.resolve(Response::success(&Ack::ok("Device closed successfully")));

        let response = pending.wait().await;
        assert!(response.is_success());
        assert_eq!(
            response.field("message").unwrap(),
            "Device closed successfully"
        );
    }

    #[tokio::test]
    async fn test_dropped_slot_reads_as_shutdown() {
        let (slot, pending) = response_slot(Method::PrintText);
        drop(slot);

        assert_eq!(pending.wait().await.code(), Some(ErrorCode::Shutdown));
    }

    #[tokio::test]
    async fn test_resolve_after_caller_left_is_harmless() {
        let (slot, pending) = response_slot(Method::ScanQrCode);
        drop(pending);

        slot.resolve(Error::NotOpened);
    }
}
