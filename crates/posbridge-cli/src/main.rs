//! `posbridge`: serve the POS bridge over TCP.
//!
//! Usage: `posbridge [config.json]`. Logging follows `RUST_LOG` (default
//! `info`); `POSBRIDGE_BIND` overrides the listen address.
//!
//! The binary drives mock devices. Lines typed on stdin are delivered to the
//! mock QR scanner while a scan is waiting; `!paper-out` and `!paper-ok`
//! switch the mock printer status.

mod config;

use anyhow::{Context, Result};
use config::{BIND_ENV, Settings};
use posbridge_core::constants::{PRINTER_STATUS_OK, PRINTER_STATUS_PAPER_OUT};
use posbridge_hardware::AnyDriverManager;
use posbridge_hardware::mock::{MockDriverManager, MockPrinterHandle, MockScannerHandle};
use posbridge_network::RpcServer;
use posbridge_session::PosBridge;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let bind = std::env::var(BIND_ENV).ok();
    let settings = Settings::load(config_path.as_deref())?.with_bind_override(bind.as_deref())?;

    info!(version = posbridge_core::VERSION, "Starting posbridge");
    warn!("No terminal driver configured, using mock devices");

    let (manager, printer, scanner) = MockDriverManager::standard();
    let bridge = PosBridge::start(AnyDriverManager::Mock(manager), settings.bridge.clone());

    let server = RpcServer::bind(settings.server.clone(), bridge.clone())
        .await
        .context("Failed to start RPC server")?;

    tokio::spawn(console(printer, scanner));

    let served = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for ctrl-c");
            }
        })
        .await;

    bridge.shutdown().await;
    served.context("RPC server failed")?;
    info!("posbridge stopped");
    Ok(())
}

/// Feed stdin lines to the mock devices.
async fn console(printer: MockPrinterHandle, scanner: MockScannerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                return;
            }
        };

        match line.trim() {
            "" => {}
            "!paper-out" => {
                printer.set_status(PRINTER_STATUS_PAPER_OUT);
                info!("Mock printer out of paper");
            }
            "!paper-ok" => {
                printer.set_status(PRINTER_STATUS_OK);
                info!("Mock printer ready");
            }
            code => match scanner.send_scan(code).await {
                Ok(true) => info!(len = code.len(), "Scan delivered"),
                Ok(false) => info!("Scanner is not armed, input dropped"),
                Err(e) => warn!(error = %e, "Failed to deliver scan"),
            },
        }
    }
}
