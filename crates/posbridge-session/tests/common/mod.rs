//! Shared fixtures for bridge integration tests.

#![allow(dead_code)]

use posbridge_hardware::AnyDriverManager;
use posbridge_hardware::mock::{
    MockDriverManager, MockPrinter, MockPrinterConfig, MockPrinterHandle, MockScannerHandle,
};
use posbridge_protocol::{Request, Response};
use posbridge_session::{BridgeConfig, PosBridge};
use std::time::Duration;

/// A bridge over mock devices plus the handles driving them.
pub struct Rig {
    pub bridge: PosBridge,
    pub printer: MockPrinterHandle,
    pub scanner: MockScannerHandle,
}

impl Rig {
    pub async fn call(&self, method: &str) -> Response {
        self.bridge.call(Request::new(method)).await
    }

    /// Initialize and open, asserting both succeed.
    pub async fn opened(self) -> Self {
        assert!(self.call("initializeDevice").await.is_success());
        assert!(self.call("openDevice").await.is_success());
        self
    }
}

pub fn rig() -> Rig {
    rig_with(BridgeConfig::default())
}

pub fn rig_with(config: BridgeConfig) -> Rig {
    let (manager, printer, scanner) = MockDriverManager::standard();
    Rig {
        bridge: PosBridge::start(AnyDriverManager::Mock(manager), config),
        printer,
        scanner,
    }
}

/// Bridge whose printer has no cutter and no scanner attached.
pub fn bare_rig() -> (PosBridge, MockPrinterHandle) {
    let (printer, handle) = MockPrinter::with_config(MockPrinterConfig {
        supports_cutter: false,
        ..Default::default()
    });
    let manager = MockDriverManager::new(Some(printer), None);
    (
        PosBridge::start(AnyDriverManager::Mock(manager), BridgeConfig::default()),
        handle,
    )
}

/// Wait until the worker has powered the scanner and enabled capture.
pub async fn wait_until_armed(scanner: &MockScannerHandle) {
    while !scanner.is_armed() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

pub fn message(response: &Response) -> String {
    match response {
        Response::Success { payload } => payload
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string(),
        Response::Error { message, .. } => message.clone(),
        Response::NotImplemented => String::new(),
    }
}
