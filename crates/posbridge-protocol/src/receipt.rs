//! Receipt data carried by `printReceipt`.
//!
//! Callers send amounts and quantities either as strings or as numbers, so
//! those fields use [`Scalar`] and are rendered verbatim.

use posbridge_core::QrSize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A string or a number, printed as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// Interpret as an integer, parsing strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Number(n) => n.as_i64(),
        }
    }

    /// Returns `true` if the value renders as blank text.
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<Scalar>,
    #[serde(default)]
    pub price: Option<Scalar>,
}

/// The `receiptData` argument of `printReceipt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptData {
    pub store_name: Option<String>,
    pub receipt_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Option<Scalar>,
    pub tax: Option<Scalar>,
    pub total: Option<Scalar>,
    pub payment_method: Option<String>,
    pub order_number: Option<String>,
    pub qr_size: Option<Scalar>,
}

impl ReceiptData {
    /// Requested QR size, clamped; the default when absent or unparsable.
    pub fn qr_size(&self) -> QrSize {
        self.qr_size
            .as_ref()
            .and_then(Scalar::as_i64)
            .map(QrSize::clamped)
            .unwrap_or_default()
    }

    /// Returns `true` if a `qrSize` was given but could not be read as an
    /// integer.
    pub fn has_invalid_qr_size(&self) -> bool {
        self.qr_size.as_ref().is_some_and(|s| s.as_i64().is_none())
    }

    /// Caller-supplied order number, ignoring blanks.
    pub fn order_number(&self) -> Option<&str> {
        self.order_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
