//! # Receipts
//!
//! A [`Receipt`] is an immutable, ordered list of [`PrintInstruction`]s.
//! It is assembled with the chainable [`ReceiptBuilder`]:
//!
//! ```
//! use recibo::receipt::Receipt;
//!
//! let receipt = Receipt::builder()
//!     .align_center()
//!     .println("Store Name")
//!     .draw_line()
//!     .left_right("Total", "$5.00")
//!     .new_line()
//!     .cut()
//!     .build();
//!
//! assert_eq!(receipt.len(), 6);
//! ```
//!
//! Building performs no I/O; the receipt is handed to an
//! [`Encoder`](crate::encoder::Encoder) or straight to a
//! [`Printer`](crate::printer::Printer).

mod instruction;

pub use instruction::{Alignment, PrintInstruction};

use serde::{Deserialize, Serialize};

/// An immutable sequence of print instructions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt {
    instructions: Vec<PrintInstruction>,
}

impl Receipt {
    /// Start building a receipt.
    pub fn builder() -> ReceiptBuilder {
        ReceiptBuilder::new()
    }

    /// Parse a receipt from its JSON instruction list.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn instructions(&self) -> &[PrintInstruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrintInstruction> {
        self.instructions.iter()
    }
}

impl FromIterator<PrintInstruction> for Receipt {
    fn from_iter<T: IntoIterator<Item = PrintInstruction>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Receipt {
    type Item = &'a PrintInstruction;
    type IntoIter = std::slice::Iter<'a, PrintInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Chainable receipt builder.
///
/// Every method consumes and returns the builder. [`build`](Self::build)
/// borrows, so it can be called repeatedly and always yields an equal
/// snapshot. Not meant to be shared across threads while assembling.
#[derive(Debug, Clone, Default)]
pub struct ReceiptBuilder {
    instructions: Vec<PrintInstruction>,
}

impl ReceiptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary instruction.
    pub fn push(mut self, instruction: PrintInstruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Drop everything added so far.
    pub fn clear(mut self) -> Self {
        self.instructions.clear();
        self
    }

    pub fn align(self, alignment: Alignment) -> Self {
        self.push(PrintInstruction::Align(alignment))
    }

    pub fn align_left(self) -> Self {
        self.align(Alignment::Left)
    }

    pub fn align_center(self) -> Self {
        self.align(Alignment::Center)
    }

    pub fn align_right(self) -> Self {
        self.align(Alignment::Right)
    }

    /// Print a line of text.
    pub fn println(self, text: impl Into<String>) -> Self {
        self.push(PrintInstruction::TextLine(text.into()))
    }

    /// Print `left` and `right` on one line, right one flush right.
    pub fn left_right(self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.push(PrintInstruction::TwoColumn {
            left: left.into(),
            right: right.into(),
        })
    }

    /// Full-width separator.
    pub fn draw_line(self) -> Self {
        self.push(PrintInstruction::Rule)
    }

    /// One blank line.
    pub fn new_line(self) -> Self {
        self.feed(1)
    }

    /// `lines` blank lines.
    pub fn feed(self, lines: u16) -> Self {
        self.push(PrintInstruction::Feed { lines })
    }

    pub fn bold(self, enabled: bool) -> Self {
        self.push(PrintInstruction::Bold(enabled))
    }

    pub fn reset(self) -> Self {
        self.push(PrintInstruction::Reset)
    }

    /// Full cut.
    pub fn cut(self) -> Self {
        self.push(PrintInstruction::Cut { partial: false })
    }

    /// Partial cut (leaves hinge).
    pub fn partial_cut(self) -> Self {
        self.push(PrintInstruction::Cut { partial: true })
    }

    /// Snapshot the instructions added so far.
    pub fn build(&self) -> Receipt {
        Receipt {
            instructions: self.instructions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_receipt() {
        let receipt = Receipt::builder().build();
        assert!(receipt.is_empty());
    }

    #[test]
    fn test_builder_order() {
        let receipt = Receipt::builder()
            .align_center()
            .println("Store")
            .draw_line()
            .left_right("Total", "$5.00")
            .new_line()
            .build();

        assert_eq!(
            receipt.instructions(),
            &[
                PrintInstruction::Align(Alignment::Center),
                PrintInstruction::TextLine("Store".into()),
                PrintInstruction::Rule,
                PrintInstruction::TwoColumn {
                    left: "Total".into(),
                    right: "$5.00".into(),
                },
                PrintInstruction::Feed { lines: 1 },
            ]
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = Receipt::builder().println("a").cut();
        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_not_affected_by_later_additions() {
        let builder = Receipt::builder().println("a");
        let before = builder.build();
        let after = builder.println("b").build();
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_clear() {
        let receipt = Receipt::builder().println("a").clear().println("b").build();
        assert_eq!(
            receipt.instructions(),
            &[PrintInstruction::TextLine("b".into())]
        );
    }

    #[test]
    fn test_cut_variants() {
        let receipt = Receipt::builder().cut().partial_cut().build();
        assert_eq!(
            receipt.instructions(),
            &[
                PrintInstruction::Cut { partial: false },
                PrintInstruction::Cut { partial: true },
            ]
        );
    }

    #[test]
    fn test_json_round_trip_of_builder_output() {
        let receipt = Receipt::builder().align_right().println("x").reset().build();
        let json = serde_json::to_string(&receipt).unwrap();
        assert_eq!(Receipt::from_json(&json).unwrap(), receipt);
    }
}
