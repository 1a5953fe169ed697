//! Success payloads, one struct per response shape.
//!
//! Field names serialize to the camelCase keys callers read.

use serde::{Deserialize, Serialize};

/// Plain acknowledgement: `{success, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Reply to `initializeDevice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initialized {
    pub success: bool,
    pub message: String,
    pub supports_cutter: bool,
    #[serde(rename = "hasQRScanner")]
    pub has_qr_scanner: bool,
}

/// Reply to `openDevice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opened {
    pub success: bool,
    pub message: String,
    pub status: String,
}

/// Reply to `getDeviceInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoReport {
    pub model: String,
    pub serial_number: String,
    pub sdk_version: String,
    pub supports_cutter: bool,
    #[serde(rename = "hasQRScanner")]
    pub has_qr_scanner: bool,
    pub printer_status: String,
    #[serde(rename = "is80MMPrinter")]
    pub is_80mm_printer: bool,
}

/// Reply to `getPrinterStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatusReport {
    pub status_code: i32,
    pub status_message: String,
    pub is_ready: bool,
    pub is_paper_out: bool,
}

/// Reply to `printQRCode`, echoing the clamped size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPrinted {
    pub success: bool,
    pub message: String,
    pub size: u32,
}

/// Reply to `printReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPrinted {
    pub success: bool,
    pub message: String,
    pub order_number: String,
}

/// Reply to `scanQRCode` and `stopQRScan`.
///
/// Scan outcomes are always success responses; `success: false` reports a
/// scan that ran but did not produce data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub success: bool,
    pub message: String,
    pub data: String,
}

impl ScanOutcome {
    pub fn scanned(data: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "QR code scanned successfully".to_string(),
            data: data.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: String::new(),
        }
    }

    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_info_keys() {
        let info = DeviceInfoReport {
            model: "ZCS POS Terminal".to_string(),
            serial_number: "ZCS_1".to_string(),
            sdk_version: "1.8.1+".to_string(),
            supports_cutter: false,
            has_qr_scanner: true,
            printer_status: "Ready".to_string(),
            is_80mm_printer: false,
        };

        let value = serde_json::to_value(&info).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        for key in [
            "model",
            "serialNumber",
            "sdkVersion",
            "supportsCutter",
            "hasQRScanner",
            "printerStatus",
            "is80MMPrinter",
        ] {
            assert!(keys.contains(&key.to_string()), "missing {key}");
        }
    }

    #[test]
    fn test_scan_outcome_failed_has_empty_data() {
        let outcome = ScanOutcome::failed("Scanner is already in use");
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({"success": false, "message": "Scanner is already in use", "data": ""})
        );
    }

    #[test]
    fn test_printer_status_keys() {
        let report = PrinterStatusReport {
            status_code: -1001,
            status_message: "Out of paper".to_string(),
            is_ready: false,
            is_paper_out: true,
        };
        let value = serde_json::to_value(report).unwrap();
        assert_eq!(value["statusCode"], -1001);
        assert_eq!(value["isPaperOut"], true);
        assert_eq!(value["isReady"], false);
    }
}
