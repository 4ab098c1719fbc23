//! # ESC/POS Printer Commands
//!
//! Basic printer control: initialization, paper feed and cutting.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - With a parameter byte: `ESC d n`, `GS V m`
//!
//! ## Reference
//!
//! Based on the Epson "ESC/POS Application Programming Guide" command set,
//! which most generic 58mm/80mm USB receipt printers implement.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte (0x1B)
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix (0x1D)
///
/// Used for cutter control and other device-level commands.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Largest line count a single `ESC d n` can feed.
pub const MAX_FEED_LINES: u8 = u8::MAX;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets the printer to its power-on modes.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## What Gets Reset
///
/// - Print buffer is cleared
/// - Emphasis disabled
/// - Alignment reset to left
/// - Character code table reset to the printer default
///
/// ```
/// use recibo::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer and feeds the paper `n` lines.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
///
/// ```
/// use recibo::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x1B, 0x64, 3]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// Feed an arbitrary number of lines, splitting into `ESC d 255` chunks.
///
/// Returns an empty vector for `lines == 0`.
pub fn feed(lines: u16) -> Vec<u8> {
    let mut out = Vec::new();
    let mut remaining = lines;
    while remaining > 0 {
        let n = remaining.min(MAX_FEED_LINES as u16) as u8;
        out.extend(feed_lines(n));
        remaining -= n as u16;
    }
    out
}

// ============================================================================
// CUTTER CONTROL
// ============================================================================

/// # Select Cut Mode and Cut Paper (GS V m)
///
/// | Mode    | Bytes    |
/// |---------|----------|
/// | Full    | 1D 56 00 |
/// | Partial | 1D 56 01 |
///
/// Partial cuts leave a small hinge so the receipt does not drop.
#[inline]
pub fn cut(partial: bool) -> Vec<u8> {
    vec![GS, b'V', partial as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(0), vec![0x1B, 0x64, 0x00]);
        assert_eq!(feed_lines(255), vec![0x1B, 0x64, 0xFF]);
    }

    #[test]
    fn test_feed_zero_is_empty() {
        assert!(feed(0).is_empty());
    }

    #[test]
    fn test_feed_splits_above_255() {
        assert_eq!(
            feed(300),
            vec![0x1B, 0x64, 0xFF, 0x1B, 0x64, 45],
        );
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(false), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut(true), vec![0x1D, 0x56, 0x01]);
    }
}
