//! # Sample Receipts
//!
//! Ready-made receipts for trying out a printer.
//!
//! | Name | Contents |
//! |------|----------|
//! | `store` | Store receipt with header, one line item and totals |
//! | `test-page` | Alignment, emphasis, separators and the charset's accents |

use chrono::Local;

use crate::receipt::Receipt;

/// Timestamp format printed on the store receipt (`17/11/2024 10:20`).
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

// ============================================================================
// RECEIPT TEMPLATES
// ============================================================================

/// The store receipt, stamped with the current local time.
pub fn store_receipt() -> Receipt {
    let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
    store_receipt_at(&now)
}

/// The store receipt with a fixed timestamp line.
pub fn store_receipt_at(timestamp: &str) -> Receipt {
    Receipt::builder()
        // Header
        .align_center()
        .println("Store Name")
        .println("City")
        .println("Province")
        .println("Phone Number")
        .new_line()
        .align_left()
        .println(timestamp)
        .draw_line()
        // Items
        .println("1. Product Name")
        .left_right("   1x Price", "Price")
        .draw_line()
        .align_left()
        .println("Products: 1")
        .println("Items: 1")
        .draw_line()
        // Totals
        .left_right("Total", "Price")
        .left_right("Cash", "Price")
        .left_right("Change", "Price")
        .draw_line()
        .new_line()
        // Footer
        .align_center()
        .println("Thank You")
        .new_line()
        .new_line()
        .build()
}

/// A page exercising every instruction.
pub fn test_page() -> Receipt {
    Receipt::builder()
        .align_center()
        .bold(true)
        .println("TEST PAGE")
        .bold(false)
        .draw_line()
        .align_left()
        .println("left")
        .align_center()
        .println("center")
        .align_right()
        .println("right")
        .align_left()
        .draw_line()
        .left_right("left column", "right")
        .left_right("a much longer left column that will not fit", "12.50")
        .draw_line()
        .println("Zażółć gęślą jaźń")
        .println("Příliš žluťoučký kůň")
        .feed(3)
        .partial_cut()
        .build()
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// List available sample receipts
pub fn list_samples() -> &'static [&'static str] {
    &["store", "test-page"]
}

/// Get a sample receipt by name
pub fn by_name(name: &str) -> Option<Receipt> {
    match name.to_lowercase().as_str() {
        "store" | "receipt" => Some(store_receipt()),
        "test-page" | "test_page" | "test" => Some(test_page()),
        _ => None,
    }
}

/// Check if a name is a sample receipt
pub fn is_sample(name: &str) -> bool {
    by_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::receipt::PrintInstruction;
    use chrono::NaiveDateTime;

    #[test]
    fn test_store_receipt_layout() {
        let receipt = store_receipt_at("17/11/2024 10:20");
        let instructions = receipt.instructions();

        assert_eq!(
            instructions.first(),
            Some(&PrintInstruction::Align(crate::receipt::Alignment::Center))
        );
        assert!(instructions.contains(&PrintInstruction::TextLine("17/11/2024 10:20".into())));
        assert_eq!(
            instructions
                .iter()
                .filter(|i| **i == PrintInstruction::Rule)
                .count(),
            4
        );
        assert_eq!(
            &instructions[instructions.len() - 2..],
            &[
                PrintInstruction::Feed { lines: 1 },
                PrintInstruction::Feed { lines: 1 }
            ]
        );
    }

    #[test]
    fn test_store_receipt_timestamp_format() {
        let receipt = store_receipt();
        let stamp = receipt
            .iter()
            .find_map(|i| match i {
                PrintInstruction::TextLine(line) if line.contains('/') => Some(line.clone()),
                _ => None,
            })
            .unwrap();
        assert!(NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_samples_encode() {
        let encoder = Encoder::default();
        for name in list_samples() {
            let receipt = by_name(name).unwrap();
            assert!(!encoder.encode(&receipt).unwrap().is_empty(), "{name}");
        }
    }

    #[test]
    fn test_lookup() {
        assert!(is_sample("STORE"));
        assert!(is_sample("test_page"));
        assert!(!is_sample("ripple"));
    }
}
