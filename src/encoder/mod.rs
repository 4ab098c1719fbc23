//! # Command Encoder
//!
//! Compiles a [`Receipt`] into the printer's ESC/POS byte stream.
//!
//! ```text
//! Receipt ──► Encoder (alignment/emphasis state, charset, width) ──► EncodedBuffer
//! ```
//!
//! Encoding is pure: the same receipt and configuration always produce the
//! same bytes. Modal commands (alignment, emphasis) are emitted only when
//! the mode actually changes, starting from the printer's post-`ESC @`
//! defaults.
//!
//! ## Example
//!
//! ```
//! use recibo::encoder::{Encoder, EncoderConfig};
//! use recibo::receipt::Receipt;
//!
//! let encoder = Encoder::new(EncoderConfig::default());
//! let receipt = Receipt::builder()
//!     .align_center()
//!     .println("Store")
//!     .build();
//!
//! let buffer = encoder.encode(&receipt).unwrap();
//! assert_eq!(buffer.as_bytes(), b"\x1Ba\x01Store\n");
//! ```

mod layout;

pub use layout::RULE_CHAR;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::protocol::charset::{Charset, UnmappedPolicy};
use crate::protocol::commands::{self, LF};
use crate::protocol::text::{self, Alignment};
use crate::receipt::{PrintInstruction, Receipt};

/// Columns of a 58mm printer with the standard font.
pub const DEFAULT_COLUMNS: u16 = 32;

/// Encoder settings, fixed for the encoder's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Characters per printed line.
    pub columns: u16,
    pub charset: Charset,
    pub unmapped: UnmappedPolicy,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            charset: Charset::default(),
            unmapped: UnmappedPolicy::default(),
        }
    }
}

/// The encoded bytes of one receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBuffer {
    bytes: Vec<u8>,
}

impl EncodedBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for EncodedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Modal printer state tracked while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ModeState {
    alignment: Alignment,
    bold: bool,
}

/// Receipt to ESC/POS compiler.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn columns(&self) -> usize {
        self.config.columns as usize
    }

    /// Bytes that put the printer into a known state before a receipt:
    /// `ESC @` followed by the code table selection.
    pub fn job_header(&self) -> Vec<u8> {
        let mut out = commands::init();
        out.extend(text::code_table(self.config.charset.code_table()));
        out
    }

    /// Compile a receipt.
    pub fn encode(&self, receipt: &Receipt) -> Result<EncodedBuffer, EncodingError> {
        let mut out = Vec::new();
        let mut state = ModeState::default();

        for instruction in receipt {
            match instruction {
                PrintInstruction::Align(alignment) => {
                    if *alignment != state.alignment {
                        state.alignment = *alignment;
                        out.extend(text::align(*alignment));
                    }
                }
                PrintInstruction::Bold(enabled) => {
                    if *enabled != state.bold {
                        state.bold = *enabled;
                        out.extend(text::bold(*enabled));
                    }
                }
                PrintInstruction::TextLine(line) => {
                    out.extend(self.text(line)?);
                    out.push(LF);
                }
                PrintInstruction::Rule => {
                    out.extend(layout::rule(self.columns()));
                    out.push(LF);
                }
                PrintInstruction::TwoColumn { left, right } => {
                    let left = self.text(left)?;
                    let right = self.text(right)?;
                    out.extend(layout::two_column(&left, &right, self.columns()));
                    out.push(LF);
                }
                PrintInstruction::Feed { lines } => {
                    out.extend(commands::feed(*lines));
                }
                PrintInstruction::Reset => {
                    state = ModeState::default();
                    out.extend(self.job_header());
                }
                PrintInstruction::Cut { partial } => {
                    out.extend(commands::cut(*partial));
                }
            }
        }

        Ok(EncodedBuffer { bytes: out })
    }

    fn text(&self, s: &str) -> Result<Vec<u8>, EncodingError> {
        self.config.charset.encode(s, self.config.unmapped)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CENTER: &[u8] = &[0x1B, 0x61, 0x01];
    const LEFT: &[u8] = &[0x1B, 0x61, 0x00];

    fn encode(receipt: &Receipt) -> Vec<u8> {
        Encoder::default().encode(receipt).unwrap().into_vec()
    }

    fn cat(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_empty_receipt_is_empty() {
        assert!(encode(&Receipt::default()).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let receipt = Receipt::builder()
            .align_center()
            .println("Store")
            .left_right("a", "b")
            .build();
        assert_eq!(encode(&receipt), encode(&receipt));
    }

    #[test]
    fn test_consecutive_alignment_emitted_once() {
        let receipt = Receipt::builder()
            .align_center()
            .align_center()
            .println("x")
            .build();
        let bytes = encode(&receipt);
        assert_eq!(count(&bytes, CENTER), 1);
        assert_eq!(bytes, cat(&[CENTER, b"x\n"]));
    }

    #[test]
    fn test_initial_left_alignment_is_implicit() {
        let receipt = Receipt::builder().align_left().println("x").build();
        assert_eq!(encode(&receipt), b"x\n");
    }

    #[test]
    fn test_alignment_change_back_to_left() {
        let receipt = Receipt::builder()
            .align_center()
            .println("a")
            .align_left()
            .println("b")
            .build();
        assert_eq!(encode(&receipt), cat(&[CENTER, b"a\n", LEFT, b"b\n"]));
    }

    #[test]
    fn test_reset_restores_left_and_reemits() {
        let receipt = Receipt::builder()
            .align_center()
            .reset()
            .align_center()
            .build();
        let bytes = encode(&receipt);
        let header = Encoder::default().job_header();
        assert_eq!(bytes, cat(&[CENTER, &header, CENTER]));
    }

    #[test]
    fn test_reset_then_left_emits_nothing() {
        let receipt = Receipt::builder().align_right().reset().align_left().build();
        let bytes = encode(&receipt);
        assert_eq!(count(&bytes, LEFT), 0);
    }

    #[test]
    fn test_reset_clears_bold() {
        let receipt = Receipt::builder()
            .bold(true)
            .reset()
            .bold(true)
            .println("x")
            .build();
        let bytes = encode(&receipt);
        let header = Encoder::default().job_header();
        let bold_on: &[u8] = &[0x1B, 0x45, 0x01];
        assert_eq!(count(&bytes, bold_on), 2);
        assert_eq!(bytes, cat(&[bold_on, &header, bold_on, b"x\n"]));
    }

    #[test]
    fn test_reset_then_bold_off_emits_nothing() {
        let receipt = Receipt::builder().bold(true).reset().bold(false).build();
        let bytes = encode(&receipt);
        assert_eq!(count(&bytes, &[0x1B, 0x45, 0x00]), 0);
    }

    #[test]
    fn test_bold_emitted_on_change_only() {
        let receipt = Receipt::builder()
            .bold(false)
            .bold(true)
            .bold(true)
            .println("B")
            .bold(false)
            .build();
        assert_eq!(
            encode(&receipt),
            cat(&[&[0x1B, 0x45, 0x01], b"B\n", &[0x1B, 0x45, 0x00]])
        );
    }

    #[test]
    fn test_rule_is_full_width() {
        let encoder = Encoder::new(EncoderConfig {
            columns: 56,
            ..Default::default()
        });
        let bytes = encoder
            .encode(&Receipt::builder().draw_line().build())
            .unwrap()
            .into_vec();
        assert_eq!(bytes.len(), 57);
        assert!(bytes[..56].iter().all(|&b| b == RULE_CHAR));
        assert_eq!(bytes[56], LF);
    }

    #[test]
    fn test_two_column_width_32() {
        let bytes = encode(&Receipt::builder().left_right("A", "B").build());
        assert_eq!(bytes.len(), 33);
        assert_eq!(&bytes[..32], format!("A{}B", " ".repeat(30)).as_bytes());
    }

    #[test]
    fn test_two_column_counts_characters_not_utf8_bytes() {
        // "Łódź" is 4 columns in PC852 even though it is 7 UTF-8 bytes.
        let bytes = encode(&Receipt::builder().left_right("Łódź", "1").build());
        assert_eq!(bytes.len(), 33);
    }

    #[test]
    fn test_two_column_truncates_left() {
        let left = "x".repeat(40);
        let bytes = encode(&Receipt::builder().left_right(left, "$5.00").build());
        assert_eq!(&bytes[..32], format!("{}$5.00", "x".repeat(27)).as_bytes());
    }

    #[test]
    fn test_feed_and_cut() {
        let receipt = Receipt::builder().feed(0).new_line().cut().build();
        assert_eq!(encode(&receipt), vec![0x1B, 0x64, 0x01, 0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_job_header_selects_code_table() {
        let encoder = Encoder::new(EncoderConfig {
            charset: Charset::Pc852,
            ..Default::default()
        });
        assert_eq!(encoder.job_header(), vec![0x1B, 0x40, 0x1B, 0x74, 18]);
        assert_eq!(encoder.config().charset, Charset::Pc852);
        assert_eq!(encoder.config().columns, DEFAULT_COLUMNS);
    }

    #[test]
    fn test_strict_policy_fails() {
        let encoder = Encoder::new(EncoderConfig {
            charset: Charset::Ascii,
            unmapped: UnmappedPolicy::Strict,
            ..Default::default()
        });
        let err = encoder
            .encode(&Receipt::builder().left_right("Total", "5 €").build())
            .unwrap_err();
        assert!(matches!(
            err,
            EncodingError::UnsupportedCharacter { ch: '€', .. }
        ));
    }

    #[test]
    fn test_replace_policy_substitutes() {
        let encoder = Encoder::new(EncoderConfig {
            charset: Charset::Ascii,
            ..Default::default()
        });
        let bytes = encoder
            .encode(&Receipt::builder().println("5 €").build())
            .unwrap();
        assert_eq!(bytes.as_bytes(), b"5 ?\n");
    }
}
