//! Receipt layout.
//!
//! Turns [`ReceiptData`] into the ordered [`PrintElement`]s of a receipt
//! sized for a 32-column roll.

use posbridge_core::constants::{DEFAULT_STORE_NAME, RECEIPT_CURRENCY};
use posbridge_hardware::{Alignment, PrintElement, TextFormat};
use posbridge_protocol::{ReceiptData, ReceiptItem, Scalar};
use rand::Rng;

const SEPARATOR: &str = "--------------------------------";
const DOUBLE_SEPARATOR: &str = "================================";
const COLUMN_HEADER: &str = "ITEM            QTY    AMOUNT";

/// Longest item name printed before truncation.
const ITEM_NAME_WIDTH: usize = 15;

struct Formats {
    header: TextFormat,
    sub_header: TextFormat,
    normal: TextFormat,
    bold: TextFormat,
    order_number: TextFormat,
    small: TextFormat,
    item: TextFormat,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: TextFormat::new(50).bold().aligned(Alignment::Center),
            sub_header: TextFormat::new(30).bold().aligned(Alignment::Center),
            normal: TextFormat::new(22).monospace(),
            bold: TextFormat::new(26).bold().monospace(),
            order_number: TextFormat::new(40).bold().aligned(Alignment::Center),
            small: TextFormat::new(20).monospace(),
            item: TextFormat::new(25).monospace(),
        }
    }
}

/// Lay out a receipt. The QR code and the order-number block carry
/// `order_number`.
pub fn compose_receipt(data: &ReceiptData, order_number: &str) -> Vec<PrintElement> {
    let formats = Formats::new();
    let mut out = Vec::with_capacity(32 + data.items.len());
    let mut line = |text: &str, format: TextFormat| out.push(PrintElement::text(text, format));

    line(
        non_blank(data.store_name.as_deref()).unwrap_or(DEFAULT_STORE_NAME),
        formats.header,
    );
    if let Some(receipt_type) = non_blank(data.receipt_type.as_deref()) {
        line(receipt_type, formats.sub_header);
    }
    line("", formats.normal);

    if let Some(date) = non_blank(data.date.as_deref()) {
        line(&format!("Date: {date}"), formats.normal);
    }
    if let Some(time) = non_blank(data.time.as_deref()) {
        line(&format!("Time: {time}"), formats.normal);
    }

    line(SEPARATOR, formats.normal);
    line(COLUMN_HEADER, formats.bold);
    line(SEPARATOR, formats.normal);

    for item in &data.items {
        line(&item_line(item), formats.item);
    }
    line(SEPARATOR, formats.normal);

    if let Some(subtotal) = amount(data.subtotal.as_ref()) {
        line(&summary_line("Subtotal:", &subtotal), formats.normal);
    }
    if let Some(tax) = amount(data.tax.as_ref()) {
        line(&summary_line("Tax:", &tax), formats.normal);
    }
    if let Some(total) = amount(data.total.as_ref()) {
        line(DOUBLE_SEPARATOR, formats.normal);
        line(&summary_line("TOTAL:", &total), formats.bold);
        line(DOUBLE_SEPARATOR, formats.normal);
    }

    if let Some(method) = non_blank(data.payment_method.as_deref()) {
        line("", formats.small);
        line(&format!("Payment Method: {method}"), formats.small);
    }

    line("", formats.small);
    line("Thank you for your visit!", formats.small);
    line("Enjoy responsibly!", formats.small);
    line("", formats.small);
    line("", formats.small);

    line("Scan QR Code:", formats.normal);
    line("", formats.small);
    out.push(PrintElement::QrCode {
        data: order_number.to_string(),
        size: data.qr_size().get(),
        alignment: Alignment::Center,
    });

    let mut line = |text: &str, format: TextFormat| out.push(PrintElement::text(text, format));
    line("", formats.small);
    line("", formats.small);
    line(DOUBLE_SEPARATOR, formats.small);
    line("ORDER NUMBER", formats.sub_header);
    line(order_number, formats.order_number);
    line(DOUBLE_SEPARATOR, formats.small);

    // Tear-off margin
    for _ in 0..4 {
        line("", formats.small);
    }
    line("\n", formats.small);
    line("\n", formats.small);

    out
}

/// Random `ORD-NNNN` number in `1..=9999`.
pub fn generate_order_number() -> String {
    let n: u32 = rand::rng().random_range(1..=9999);
    format!("ORD-{n:04}")
}

/// Truncate text to `max_chars` characters.
///
/// ```
/// use posbridge_session::receipt::truncate_text;
///
/// assert_eq!(truncate_text("Nairobi", 4), "Nair");
/// assert_eq!(truncate_text("Tea", 10), "Tea");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Item name fitted to the name column, marking cuts with `...`.
pub fn fit_item_name(name: &str) -> String {
    if name.chars().count() > ITEM_NAME_WIDTH {
        format!("{}...", truncate_text(name, ITEM_NAME_WIDTH - 3))
    } else {
        name.to_string()
    }
}

fn item_line(item: &ReceiptItem) -> String {
    let name = fit_item_name(non_blank(item.name.as_deref()).unwrap_or("Unknown Item"));
    let quantity = item
        .quantity
        .as_ref()
        .map_or_else(|| "1".to_string(), Scalar::to_string);
    let price = item
        .price
        .as_ref()
        .map_or_else(|| "0.00".to_string(), Scalar::to_string);

    format!(
        "{:<15} {:>3}x {:>9}",
        name,
        quantity,
        format!("{RECEIPT_CURRENCY} {price}")
    )
}

fn summary_line(label: &str, amount: &str) -> String {
    format!("{:<20} {:>10}", label, format!("{RECEIPT_CURRENCY} {amount}"))
}

fn amount(value: Option<&Scalar>) -> Option<String> {
    value.filter(|v| !v.is_blank()).map(Scalar::to_string)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(elements: &[PrintElement]) -> Vec<&str> {
        elements.iter().filter_map(PrintElement::as_text).collect()
    }

    fn sample() -> ReceiptData {
        serde_json::from_value(json!({
            "storeName": "Corner Shop",
            "receiptType": "SALES RECEIPT",
            "date": "2025-05-10",
            "time": "12:46",
            "items": [
                {"name": "Coffee", "quantity": 2, "price": "150.00"},
                {"name": "Extra Large Cheese Sandwich", "quantity": "1", "price": 420}
            ],
            "subtotal": "720.00",
            "tax": "0.00",
            "total": "720.00",
            "paymentMethod": "Cash",
            "qrSize": "9999"
        }))
        .unwrap()
    }

    #[test]
    fn test_layout_order() {
        let elements = compose_receipt(&sample(), "ORD-0042");
        let lines = texts(&elements);

        assert_eq!(lines[0], "Corner Shop");
        assert_eq!(lines[1], "SALES RECEIPT");
        assert!(lines.contains(&"Date: 2025-05-10"));
        assert!(lines.contains(&"Payment Method: Cash"));

        let header = lines.iter().position(|l| *l == COLUMN_HEADER).unwrap();
        let thanks = lines
            .iter()
            .position(|l| *l == "Thank you for your visit!")
            .unwrap();
        let order = lines.iter().rposition(|l| *l == "ORD-0042").unwrap();
        assert!(header < thanks && thanks < order);
    }

    #[test]
    fn test_item_lines() {
        let elements = compose_receipt(&sample(), "ORD-0042");
        let lines = texts(&elements);

        assert!(lines.contains(&"Coffee            2x Kshs 150.00"));
        assert!(lines.contains(&"Extra Large ...   1x  Kshs 420"));
    }

    #[test]
    fn test_totals_block() {
        let elements = compose_receipt(&sample(), "ORD-0042");
        let lines = texts(&elements);

        assert!(lines.contains(&"Subtotal:            Kshs 720.00"));
        assert!(lines.contains(&"TOTAL:               Kshs 720.00"));
    }

    #[test]
    fn test_qr_code_carries_order_number_and_clamped_size() {
        let elements = compose_receipt(&sample(), "ORD-0042");
        let qr = elements
            .iter()
            .find_map(|e| match e {
                PrintElement::QrCode { data, size, .. } => Some((data.clone(), *size)),
                _ => None,
            })
            .unwrap();

        assert_eq!(qr, ("ORD-0042".to_string(), 600));
    }

    #[test]
    fn test_empty_receipt_uses_defaults() {
        let elements = compose_receipt(&ReceiptData::default(), "ORD-0001");
        let lines = texts(&elements);

        assert_eq!(lines[0], DEFAULT_STORE_NAME);
        assert!(!lines.iter().any(|l| l.starts_with("Date:")));
        assert!(!lines.iter().any(|l| l.starts_with("TOTAL:")));
    }

    #[test]
    fn test_missing_item_fields() {
        let line = item_line(&ReceiptItem::default());
        assert!(line.starts_with("Unknown Item"));
        assert!(line.contains("1x"));
        assert!(line.ends_with("Kshs 0.00"));
    }

    #[test]
    fn test_fit_item_name() {
        assert_eq!(fit_item_name("Exactly15Chars!"), "Exactly15Chars!");
        assert_eq!(fit_item_name("Sixteen chars!!!"), "Sixteen char...");
    }

    #[test]
    fn test_generated_order_number_shape() {
        for _ in 0..50 {
            let order = generate_order_number();
            assert_eq!(order.len(), 8);
            let n: u32 = order.strip_prefix("ORD-").unwrap().parse().unwrap();
            assert!((1..=9999).contains(&n));
        }
    }
}
