//! Command names accepted by the bridge.
//!
//! Each variant corresponds to one RPC method name. Names are matched exactly
//! (case-sensitive); anything else is reported as not implemented rather than
//! as an error.
//!
//! # Examples
//!
//! ```
//! use posbridge_protocol::{Method, Precondition};
//!
//! let method = Method::parse("printQRCode").unwrap();
//! assert_eq!(method, Method::PrintQrCode);
//! assert_eq!(method.precondition(), Precondition::Opened);
//!
//! assert!(Method::parse("startEmvTransaction").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// RPC methods understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    // Session lifecycle
    InitializeDevice,
    OpenDevice,
    CloseDevice,
    GetDeviceInfo,
    GetDeviceStatus,

    // Printer
    PrintText,
    PrintReceipt,
    PrintQrCode,
    PrintBarcode,
    CutPaper,
    GetPrinterStatus,

    // Scanner
    ScanQrCode,
    StopQrScan,
}

/// What a method needs from the device session before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precondition {
    /// Runs in any state.
    None,
    /// Requires a successful `initializeDevice`.
    Initialized,
    /// Requires `initializeDevice` and `openDevice`.
    Opened,
}

impl Method {
    /// Every method, in table order.
    pub const ALL: [Method; 13] = [
        Method::InitializeDevice,
        Method::OpenDevice,
        Method::CloseDevice,
        Method::GetDeviceInfo,
        Method::GetDeviceStatus,
        Method::PrintText,
        Method::PrintReceipt,
        Method::PrintQrCode,
        Method::PrintBarcode,
        Method::CutPaper,
        Method::GetPrinterStatus,
        Method::ScanQrCode,
        Method::StopQrScan,
    ];

    /// Look up a method by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::InitializeDevice => "initializeDevice",
            Method::OpenDevice => "openDevice",
            Method::CloseDevice => "closeDevice",
            Method::GetDeviceInfo => "getDeviceInfo",
            Method::GetDeviceStatus => "getDeviceStatus",
            Method::PrintText => "printText",
            Method::PrintReceipt => "printReceipt",
            Method::PrintQrCode => "printQRCode",
            Method::PrintBarcode => "printBarcode",
            Method::CutPaper => "cutPaper",
            Method::GetPrinterStatus => "getPrinterStatus",
            Method::ScanQrCode => "scanQRCode",
            Method::StopQrScan => "stopQRScan",
        }
    }

    /// Session state required before the method is accepted.
    pub fn precondition(&self) -> Precondition {
        match self {
            Method::InitializeDevice | Method::GetDeviceStatus => Precondition::None,
            Method::OpenDevice
            | Method::CloseDevice
            | Method::GetDeviceInfo
            | Method::GetPrinterStatus => Precondition::Initialized,
            Method::PrintText
            | Method::PrintReceipt
            | Method::PrintQrCode
            | Method::PrintBarcode
            | Method::CutPaper
            | Method::ScanQrCode
            | Method::StopQrScan => Precondition::Opened,
        }
    }

    /// Returns `true` if the method puts something on paper.
    #[inline]
    pub fn is_print(&self) -> bool {
        matches!(
            self,
            Method::PrintText | Method::PrintReceipt | Method::PrintQrCode | Method::PrintBarcode
        )
    }

    /// Returns `true` if the method drives the QR scanner.
    #[inline]
    pub fn is_scan(&self) -> bool {
        matches!(self, Method::ScanQrCode | Method::StopQrScan)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("initializeDevice", Method::InitializeDevice)]
    #[case("getDeviceStatus", Method::GetDeviceStatus)]
    #[case("printQRCode", Method::PrintQrCode)]
    #[case("scanQRCode", Method::ScanQrCode)]
    #[case("stopQRScan", Method::StopQrScan)]
    fn test_parse_known_methods(#[case] name: &str, #[case] expected: Method) {
        assert_eq!(Method::parse(name), Some(expected));
        assert_eq!(expected.as_str(), name);
    }

    #[rstest]
    #[case("")]
    #[case("printqrcode")]
    #[case("getLastScannedData")]
    #[case("searchCard")]
    fn test_parse_unknown_methods(#[case] name: &str) {
        assert_eq!(Method::parse(name), None);
    }

    #[test]
    fn test_all_names_are_unique() {
        let mut names: Vec<_> = Method::ALL.iter().map(|m| m.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Method::ALL.len());
    }

    #[test]
    fn test_preconditions() {
        assert_eq!(Method::GetDeviceStatus.precondition(), Precondition::None);
        assert_eq!(Method::InitializeDevice.precondition(), Precondition::None);
        assert_eq!(Method::CloseDevice.precondition(), Precondition::Initialized);
        assert_eq!(Method::GetPrinterStatus.precondition(), Precondition::Initialized);
        assert_eq!(Method::CutPaper.precondition(), Precondition::Opened);
        assert_eq!(Method::StopQrScan.precondition(), Precondition::Opened);
    }

    #[test]
    fn test_categories() {
        assert!(Method::PrintReceipt.is_print());
        assert!(!Method::CutPaper.is_print());
        assert!(Method::ScanQrCode.is_scan());
        assert!(!Method::GetPrinterStatus.is_scan());
    }
}
