//! Property-based tests for argument handling and method naming.

use posbridge_core::QrSize;
use posbridge_core::constants::{MAX_QR_SIZE, MIN_QR_SIZE};
use posbridge_protocol::{Method, Payload, args};
use proptest::prelude::*;
use serde_json::json;

fn size_args(size: i64) -> Payload {
    let mut map = Payload::new();
    map.insert("size".to_string(), json!(size));
    map
}

proptest! {
    /// Clamping always lands in range and is idempotent.
    #[test]
    fn prop_qr_size_clamp_in_range(requested in any::<i64>()) {
        let size = QrSize::clamped(requested);
        prop_assert!((MIN_QR_SIZE..=MAX_QR_SIZE).contains(&size.get()));
        prop_assert_eq!(QrSize::clamped(i64::from(size.get())), size);
    }

    /// Sizes already in range pass through unchanged.
    #[test]
    fn prop_qr_size_in_range_unchanged(requested in MIN_QR_SIZE..=MAX_QR_SIZE) {
        let size = args::optional_qr_size(&size_args(i64::from(requested)), "size").unwrap();
        prop_assert_eq!(size.get(), requested);
    }

    /// Whitespace-only text is always rejected.
    #[test]
    fn prop_blank_text_rejected(blank in "[ \t\r\n]{0,16}") {
        let mut map = Payload::new();
        map.insert("text".to_string(), json!(blank));
        prop_assert!(args::required_text(&map, "text", "Text").is_err());
    }

    /// Method lookup is exact: any name that is not in the table is unknown.
    #[test]
    fn prop_unknown_names_rejected(name in "[a-zA-Z]{0,20}") {
        let known = Method::ALL.iter().any(|m| m.as_str() == name);
        prop_assert_eq!(Method::parse(&name).is_some(), known);
    }
}

#[test]
fn test_every_method_round_trips_through_its_name() {
    for method in Method::ALL {
        assert_eq!(Method::parse(method.as_str()), Some(method));
    }
}
