//! Typed access to the argument bag of a [`Request`](crate::Request).
//!
//! Validation failures come back as [`Error::InvalidInput`] carrying the
//! message shown to the caller.

use crate::message::Payload;
use crate::receipt::ReceiptData;
use posbridge_core::{Error, QrSize, Result};
use serde_json::Value;

/// Read a string argument that must be present and not blank.
///
/// `label` names the argument in the error message, e.g. `"Text"` yields
/// `"Text cannot be null or empty"`. The value is returned untrimmed.
pub fn required_text<'a>(args: &'a Payload, key: &str, label: &str) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        _ => Err(Error::invalid_input(format!(
            "{label} cannot be null or empty"
        ))),
    }
}

/// Read an optional QR size, clamped into the printable range.
///
/// Absent and `null` give the default size.
pub fn optional_qr_size(args: &Payload, key: &str) -> Result<QrSize> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(QrSize::default()),
        Some(Value::Number(n)) => {
            let requested = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or_default();
            Ok(QrSize::clamped(requested))
        }
        Some(_) => Err(Error::invalid_input("QR code size must be a number")),
    }
}

/// Read the `receiptData` mapping.
pub fn receipt_data(args: &Payload) -> Result<ReceiptData> {
    match args.get("receiptData") {
        None | Some(Value::Null) => Err(Error::invalid_input("Receipt data cannot be null")),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| Error::invalid_input(format!("Invalid receipt data: {e}"))),
    }
}
