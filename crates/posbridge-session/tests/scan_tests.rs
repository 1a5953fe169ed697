//! Integration tests for single-shot QR scans.
//!
//! The clock is paused so scan timeouts and scanner settle delays elapse
//! instantly once every task is idle.

mod common;

use common::{Rig, bare_rig, message, rig, wait_until_armed};
use posbridge_hardware::mock::ScannerOp;
use posbridge_protocol::{Request, Response};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

fn start_scan(rig: &Rig) -> JoinHandle<Response> {
    let bridge = rig.bridge.clone();
    tokio::spawn(async move { bridge.call(Request::new("scanQRCode")).await })
}

fn assert_outcome(response: &Response, success: bool, text: &str, data: &str) {
    assert!(response.is_success(), "{response:?}");
    assert_eq!(response.field("success"), Some(&json!(success)));
    assert_eq!(message(response), text);
    assert_eq!(response.field("data"), Some(&json!(data)));
}

#[tokio::test(start_paused = true)]
async fn test_scan_returns_trimmed_code() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);

    wait_until_armed(&rig.scanner).await;
    assert!(rig.bridge.status().scanner_active);
    assert!(rig.scanner.send_scan("  ORD-0042\n").await.unwrap());

    let response = scan.await.unwrap();
    assert_outcome(&response, true, "QR code scanned successfully", "ORD-0042");
    assert!(!rig.scanner.is_powered());
    assert!(!rig.bridge.status().scanner_active);
}

#[tokio::test(start_paused = true)]
async fn test_scan_power_cycles_before_capture() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);

    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("x").await.unwrap();
    scan.await.unwrap();

    assert_eq!(
        rig.scanner.journal(),
        vec![
            ScannerOp::Power(false),
            ScannerOp::Power(true),
            ScannerOp::Control(true),
            ScannerOp::Control(false),
            ScannerOp::Power(false),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_scan_times_out() {
    let rig = rig().opened().await;

    let response = rig.call("scanQRCode").await;

    assert_outcome(&response, false, "Scan timeout - no QR code detected", "");
    assert!(!rig.scanner.is_powered());
    assert!(!rig.scanner.is_control_enabled());
    assert!(!rig.bridge.status().scanner_active);
}

#[tokio::test(start_paused = true)]
async fn test_input_after_completion_is_dropped() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);

    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("first").await.unwrap();
    assert_outcome(&scan.await.unwrap(), true, "QR code scanned successfully", "first");

    assert!(!rig.scanner.send_scan("late").await.unwrap());

    // A later scan does not see the stale input and times out.
    let response = rig.call("scanQRCode").await;
    assert_eq!(response.field("success"), Some(&json!(false)));
}

#[tokio::test(start_paused = true)]
async fn test_unread_input_does_not_answer_next_scan() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);

    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("first").await.unwrap();
    rig.scanner.send_scan("presented-twice").await.unwrap();
    assert_outcome(&scan.await.unwrap(), true, "QR code scanned successfully", "first");

    let response = rig.call("scanQRCode").await;
    assert_outcome(&response, false, "Scan timeout - no QR code detected", "");
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_is_ignored() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);

    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("   ").await.unwrap();
    rig.scanner.send_scan("").await.unwrap();
    rig.scanner.send_scan("ABC123").await.unwrap();

    assert_outcome(&scan.await.unwrap(), true, "QR code scanned successfully", "ABC123");
}

#[tokio::test(start_paused = true)]
async fn test_second_scan_is_rejected_while_waiting() {
    let rig = rig().opened().await;
    let first = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    let second = rig.call("scanQRCode").await;
    assert_outcome(&second, false, "Scanner is already in use", "");

    rig.scanner.send_scan("winner").await.unwrap();
    assert_outcome(&first.await.unwrap(), true, "QR code scanned successfully", "winner");
}

#[tokio::test(start_paused = true)]
async fn test_second_scan_keeps_first_deadline() {
    let rig = rig().opened().await;
    let scan_timeout = rig.bridge.config().scan.timeout;
    let started = Instant::now();
    let first = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    tokio::time::sleep(Duration::from_secs(6)).await;
    let second = rig.call("scanQRCode").await;
    assert_outcome(&second, false, "Scanner is already in use", "");

    assert_outcome(
        &first.await.unwrap(),
        false,
        "Scan timeout - no QR code detected",
        "",
    );
    let elapsed = started.elapsed();
    assert!(elapsed >= scan_timeout, "{elapsed:?}");
    assert!(elapsed < scan_timeout + Duration::from_secs(1), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_queued_second_scan_is_rejected_by_worker() {
    let rig = rig().opened().await;

    // Both are submitted before the worker has armed the scanner.
    let first = rig.bridge.call(Request::new("scanQRCode"));
    let second = rig.bridge.call(Request::new("scanQRCode"));
    tokio::pin!(first, second);
    assert!(futures::poll!(first.as_mut()).is_pending());
    assert!(futures::poll!(second.as_mut()).is_pending());

    assert_outcome(&second.await, false, "Scanner is already in use", "");

    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("only").await.unwrap();
    assert_outcome(&first.await, true, "QR code scanned successfully", "only");
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_waiting_scan() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    let stop = rig.call("stopQRScan").await;
    assert_outcome(&stop, true, "QR scanner powered off", "");

    assert_outcome(&scan.await.unwrap(), false, "Scan cancelled", "");
    assert!(!rig.scanner.is_powered());
    assert!(!rig.bridge.status().scanner_active);
}

#[tokio::test(start_paused = true)]
async fn test_stop_when_idle() {
    let rig = rig().opened().await;

    let stop = rig.call("stopQRScan").await;

    assert_outcome(&stop, true, "QR scanner powered off", "");
    assert_eq!(
        rig.scanner.journal(),
        vec![ScannerOp::Power(false), ScannerOp::Control(false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_reports_hardware_failure() {
    let rig = rig().opened().await;
    rig.scanner.set_failure(Some("i2c timeout"));

    let stop = rig.call("stopQRScan").await;

    assert_outcome(
        &stop,
        false,
        "Failed to stop QR scanner: Communication error: i2c timeout",
        "",
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_waiting_scan() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    assert!(rig.call("closeDevice").await.is_success());

    assert_outcome(&scan.await.unwrap(), false, "Scan cancelled", "");
    assert!(!rig.scanner.is_powered());
    let status = rig.bridge.status();
    assert!(!status.opened);
    assert!(!status.scanner_active);
}

#[tokio::test(start_paused = true)]
async fn test_other_commands_run_while_scan_waits() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    let printed = rig
        .bridge
        .call(Request::new("printText").arg("text", "while scanning"))
        .await;
    assert!(printed.is_success());
    assert!(rig.bridge.status().scanner_active);

    rig.scanner.send_scan("done").await.unwrap();
    assert_outcome(&scan.await.unwrap(), true, "QR code scanned successfully", "done");
}

#[tokio::test(start_paused = true)]
async fn test_activation_failure() {
    let rig = rig().opened().await;
    rig.scanner.set_failure(Some("no power"));

    let response = rig.call("scanQRCode").await;

    assert_outcome(
        &response,
        false,
        "Failed to activate scanner: Communication error: no power",
        "",
    );
    assert!(!rig.bridge.status().scanner_active);

    rig.scanner.set_failure(None);
    let retry = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;
    rig.scanner.send_scan("again").await.unwrap();
    assert_outcome(&retry.await.unwrap(), true, "QR code scanned successfully", "again");
}

#[tokio::test(start_paused = true)]
async fn test_read_fault_ends_scan() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    rig.scanner.send_fault("frame error").await.unwrap();

    assert_outcome(
        &scan.await.unwrap(),
        false,
        "Failed to read QR scanner: Communication error: frame error",
        "",
    );
    assert!(!rig.scanner.is_powered());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_waiting_scan() {
    let rig = rig().opened().await;
    let scan = start_scan(&rig);
    wait_until_armed(&rig.scanner).await;

    rig.bridge.shutdown().await;

    assert_outcome(&scan.await.unwrap(), false, "Scan cancelled", "");
    assert!(!rig.scanner.is_powered());
}

#[tokio::test(start_paused = true)]
async fn test_scan_without_scanner() {
    let (bridge, _printer) = bare_rig();
    bridge.call(Request::new("initializeDevice")).await;
    bridge.call(Request::new("openDevice")).await;

    let scan = bridge.call(Request::new("scanQRCode")).await;
    assert_outcome(&scan, false, "QR Scanner not available on this device", "");

    let stop = bridge.call(Request::new("stopQRScan")).await;
    assert_outcome(
        &stop,
        false,
        "Failed to stop QR scanner: QR Scanner not available on this device",
        "",
    );
}
