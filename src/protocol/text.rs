//! # ESC/POS Text Styling Commands
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```
//!
//! Alignment and emphasis are modal: they stay in effect until changed or
//! until the printer is initialized with `ESC @`.

use serde::{Deserialize, Serialize};

use super::commands::ESC;

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// - `n = 0`: Left (default)
/// - `n = 1`: Center
/// - `n = 2`: Right
///
/// Only takes effect at the beginning of a line.
///
/// ```
/// use recibo::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// # Turn Emphasized Mode On/Off (ESC E n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC E n  |
/// | Hex     | 1B 45 n  |
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

/// # Select Character Code Table (ESC t n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC t n  |
/// | Hex     | 1B 74 n  |
///
/// Common tables: `0` = PC437 (USA), `18` = PC852 (Latin-2).
#[inline]
pub fn code_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold(true), vec![0x1B, 0x45, 0x01]);
        assert_eq!(bold(false), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_code_table() {
        assert_eq!(code_table(18), vec![0x1B, 0x74, 0x12]);
    }

    #[test]
    fn test_alignment_default_is_left() {
        assert_eq!(Alignment::default(), Alignment::Left);
    }
}
