//! # Print Instructions
//!
//! The semantic vocabulary of a receipt. Each instruction is self-contained;
//! the only state carried between instructions during encoding is the
//! current alignment and emphasis.
//!
//! Instructions serialize to JSON in serde's external tagging:
//!
//! ```json
//! [
//!   { "align": "center" },
//!   { "text_line": "Store Name" },
//!   "rule",
//!   { "two_column": { "left": "Total", "right": "$5.00" } },
//!   { "feed": { "lines": 2 } },
//!   { "cut": { "partial": false } }
//! ]
//! ```

use serde::{Deserialize, Serialize};

pub use crate::protocol::text::Alignment;

/// One step of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintInstruction {
    /// Set alignment for the following lines.
    Align(Alignment),

    /// A line of text followed by a line feed.
    TextLine(String),

    /// A full-width separator line.
    Rule,

    /// `left` flush left and `right` flush right on one line.
    TwoColumn { left: String, right: String },

    /// Feed blank lines.
    Feed { lines: u16 },

    /// Reinitialize the printer; alignment and emphasis return to defaults.
    Reset,

    /// Emphasized (bold) text on/off.
    Bold(bool),

    /// Cut the paper. `partial: true` leaves a small hinge.
    Cut { partial: bool },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let instructions = vec![
            PrintInstruction::Align(Alignment::Center),
            PrintInstruction::TextLine("Store".into()),
            PrintInstruction::Rule,
            PrintInstruction::TwoColumn {
                left: "Total".into(),
                right: "$5.00".into(),
            },
            PrintInstruction::Feed { lines: 2 },
        ];
        let json = serde_json::to_string(&instructions).unwrap();
        assert_eq!(
            json,
            r#"[{"align":"center"},{"text_line":"Store"},"rule",{"two_column":{"left":"Total","right":"$5.00"}},{"feed":{"lines":2}}]"#
        );
    }

    #[test]
    fn test_json_parse() {
        let parsed: Vec<PrintInstruction> =
            serde_json::from_str(r#"["reset", {"bold": true}, {"cut": {"partial": true}}]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                PrintInstruction::Reset,
                PrintInstruction::Bold(true),
                PrintInstruction::Cut { partial: true },
            ]
        );
    }
}
